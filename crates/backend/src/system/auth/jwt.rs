use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use contracts::system::auth::TokenClaims;
use contracts::system::users::User;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;

const ACCESS_TOKEN_LIFETIME_HOURS: i64 = 24;
const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 90;

/// Claims access-токена: роль и ссылки на справочники берутся из пользователя
pub fn claims_for(user: &User, now: DateTime<Utc>) -> TokenClaims {
    TokenClaims {
        sub: user.id.clone(),
        username: user.username.clone(),
        role: user.role,
        technician_ref: user.technician_ref.clone(),
        customer_ref: user.customer_ref.clone(),
        exp: (now + chrono::Duration::hours(ACCESS_TOKEN_LIFETIME_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    }
}

pub fn encode_claims(claims: &TokenClaims, secret: &str) -> Result<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT token")
}

pub fn decode_claims(token: &str, secret: &str) -> Result<TokenClaims> {
    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT token")?;
    Ok(token_data.claims)
}

/// Generate JWT access token with 24 hours lifetime
pub async fn generate_access_token(user: &User) -> Result<String> {
    let secret = get_jwt_secret().await?;
    encode_claims(&claims_for(user, Utc::now()), &secret)
}

/// Validate JWT token and extract claims
pub async fn validate_token(token: &str) -> Result<TokenClaims> {
    let secret = get_jwt_secret().await?;
    decode_claims(token, &secret)
}

/// Generate refresh token (UUID-based)
pub fn generate_refresh_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Get or create JWT secret from database
pub async fn get_jwt_secret() -> Result<String> {
    match get_jwt_secret_from_db().await {
        Ok(Some(secret)) => Ok(secret),
        Ok(None) | Err(_) => {
            let secret = generate_jwt_secret();
            if let Err(e) = save_jwt_secret_to_db(&secret).await {
                tracing::warn!("Failed to persist JWT secret: {}", e);
                return Ok(secret);
            }
            // Перечитываем: при одновременной генерации сохраняется первый секрет
            Ok(get_jwt_secret_from_db().await?.unwrap_or(secret))
        }
    }
}

/// Generate a cryptographically secure JWT secret (256 bits)
fn generate_jwt_secret() -> String {
    use base64::{engine::general_purpose, Engine as _};
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen::<u8>()).collect();
    general_purpose::STANDARD.encode(&random_bytes)
}

async fn get_jwt_secret_from_db() -> Result<Option<String>> {
    use crate::shared::data::db::get_connection;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    let conn = get_connection();

    let result = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT value FROM sys_settings WHERE key = ?",
            ["jwt_secret".into()],
        ))
        .await?;

    match result {
        Some(row) => {
            let secret: String = row.try_get("", "value")?;
            Ok(Some(secret))
        }
        None => Ok(None),
    }
}

async fn save_jwt_secret_to_db(secret: &str) -> Result<()> {
    use crate::shared::data::db::get_connection;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    let conn = get_connection();
    let now = Utc::now().to_rfc3339();

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT OR IGNORE INTO sys_settings (key, value, description, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?)",
        [
            "jwt_secret".into(),
            secret.to_string().into(),
            "Auto-generated JWT secret for authentication".into(),
            now.clone().into(),
            now.into(),
        ],
    ))
    .await?;

    Ok(())
}

/// Calculate refresh token expiration timestamp
pub fn calculate_refresh_token_expiration() -> String {
    let exp = Utc::now() + chrono::Duration::days(REFRESH_TOKEN_LIFETIME_DAYS);
    exp.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::system::auth::UserRole;

    fn user(role: UserRole) -> User {
        User {
            id: "u-1".into(),
            username: "ivan".into(),
            email: None,
            full_name: None,
            is_active: true,
            role,
            technician_ref: Some("t-1".into()),
            customer_ref: None,
            created_at: String::new(),
            updated_at: String::new(),
            last_login_at: None,
            created_by: None,
        }
    }

    #[test]
    fn test_claims_carry_role_and_refs() {
        let now = Utc::now();
        let claims = claims_for(&user(UserRole::Technician), now);
        assert_eq!(claims.role, UserRole::Technician);
        assert_eq!(claims.technician_ref.as_deref(), Some("t-1"));
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert!(!claims.is_admin());
    }

    #[test]
    fn test_token_round_trip_and_wrong_secret() {
        let claims = claims_for(&user(UserRole::Admin), Utc::now());
        let token = encode_claims(&claims, "secret-a").unwrap();
        let decoded = decode_claims(&token, "secret-a").unwrap();
        assert_eq!(decoded.sub, "u-1");
        assert!(decoded.is_admin());
        assert!(decode_claims(&token, "secret-b").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let past = Utc::now() - chrono::Duration::hours(48);
        let token = encode_claims(&claims_for(&user(UserRole::Admin), past), "s").unwrap();
        assert!(decode_claims(&token, "s").is_err());
    }
}
