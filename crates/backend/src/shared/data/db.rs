use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use std::path::Path;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Схема БД: создаётся при старте, если таблиц ещё нет
const SCHEMA: &[(&str, &str)] = &[
    (
        "a001_contract",
        r#"
        CREATE TABLE IF NOT EXISTS a001_contract (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            status TEXT NOT NULL DEFAULT 'draft',
            kind TEXT NOT NULL DEFAULT 'contract',
            total_value REAL NOT NULL DEFAULT 0,
            customer_ref TEXT NOT NULL,
            customer_name TEXT NOT NULL DEFAULT '',
            external_ref TEXT,
            signed_at TEXT,
            valid_until TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a002_contract_file",
        r#"
        CREATE TABLE IF NOT EXISTS a002_contract_file (
            id TEXT PRIMARY KEY NOT NULL,
            contract_id TEXT NOT NULL,
            external_file_id TEXT NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL DEFAULT 'pdf',
            download_status TEXT NOT NULL DEFAULT 'pending',
            size INTEGER NOT NULL DEFAULT 0,
            local_path TEXT,
            downloaded_at TEXT,
            created_at TEXT NOT NULL,
            UNIQUE (contract_id, external_file_id)
        );
        "#,
    ),
    (
        "a003_customer",
        r#"
        CREATE TABLE IF NOT EXISTS a003_customer (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            email TEXT,
            phone TEXT,
            address TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a004_technician",
        r#"
        CREATE TABLE IF NOT EXISTS a004_technician (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            commission_rate REAL NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a005_service_case",
        r#"
        CREATE TABLE IF NOT EXISTS a005_service_case (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            case_date TEXT NOT NULL,
            technician_ref TEXT NOT NULL,
            technician_name TEXT NOT NULL DEFAULT '',
            customer_ref TEXT NOT NULL,
            customer_name TEXT NOT NULL DEFAULT '',
            contract_ref TEXT,
            pest_type TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL DEFAULT 'scheduled',
            price REAL NOT NULL DEFAULT 0,
            material_cost REAL NOT NULL DEFAULT 0,
            invoice_status TEXT NOT NULL DEFAULT 'unbilled',
            invoiced_at TEXT,
            paid_at TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "idx_a005_case_date",
        "CREATE INDEX IF NOT EXISTS idx_a005_case_date ON a005_service_case (case_date);",
    ),
    (
        "sys_users",
        r#"
        CREATE TABLE IF NOT EXISTS sys_users (
            id TEXT PRIMARY KEY NOT NULL,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            email TEXT,
            full_name TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            role TEXT NOT NULL DEFAULT 'customer',
            technician_ref TEXT,
            customer_ref TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            last_login_at TEXT,
            created_by TEXT
        );
        "#,
    ),
    (
        "sys_refresh_tokens",
        r#"
        CREATE TABLE IF NOT EXISTS sys_refresh_tokens (
            id TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL,
            token_hash TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            created_at TEXT NOT NULL,
            revoked_at TEXT
        );
        "#,
    ),
    (
        "sys_settings",
        r#"
        CREATE TABLE IF NOT EXISTS sys_settings (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            description TEXT,
            created_at TEXT,
            updated_at TEXT
        );
        "#,
    ),
    (
        "system_log",
        r#"
        CREATE TABLE IF NOT EXISTS system_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            source TEXT NOT NULL,
            level TEXT NOT NULL DEFAULT 'info',
            category TEXT NOT NULL,
            message TEXT NOT NULL
        );
        "#,
    ),
];

fn build_sqlite_url(path: &Path) -> String {
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    format!("sqlite://{}{}?mode=rwc", prefix, normalized)
}

/// Открыть соединение и создать недостающие таблицы
pub async fn connect(db_path: &Path) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let absolute_path = if db_path.is_absolute() {
        db_path.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_path)
    };
    let conn = Database::connect(&build_sqlite_url(&absolute_path)).await?;
    bootstrap_schema(&conn).await?;
    Ok(conn)
}

/// Ensure required tables exist (minimal schema bootstrap)
pub async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    for (name, sql) in SCHEMA {
        tracing::debug!("Ensuring schema object {}", name);
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            sql.to_string(),
        ))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", name, e))?;
    }
    Ok(())
}

pub async fn initialize_database(db_path: &Path) -> anyhow::Result<()> {
    tracing::info!("Opening database: {}", db_path.display());
    let conn = connect(db_path).await?;
    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

/// Общая БД для тестов процесса: временный файл с той же схемой
#[cfg(test)]
pub async fn init_test_database() -> anyhow::Result<()> {
    if DB_CONN.get().is_some() {
        return Ok(());
    }
    let path = std::env::temp_dir().join(format!("pestdesk-test-{}.db", uuid::Uuid::new_v4()));
    let conn = connect(&path).await?;
    // Параллельный тест мог успеть раньше; его соединение остаётся
    let _ = DB_CONN.set(conn);
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_url() {
        assert_eq!(
            build_sqlite_url(Path::new("/var/db/app.db")),
            "sqlite:///var/db/app.db?mode=rwc"
        );
        assert_eq!(
            build_sqlite_url(Path::new("C:\\data\\app.db")),
            "sqlite:///C:/data/app.db?mode=rwc"
        );
    }
}
