use anyhow::Result;
use contracts::system::auth::UserRole;
use contracts::system::users::CreateUserDto;

use crate::system::users::{repository, service};

const DEFAULT_ADMIN_LOGIN: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin12345";

fn default_admin() -> CreateUserDto {
    CreateUserDto {
        username: DEFAULT_ADMIN_LOGIN.to_string(),
        password: DEFAULT_ADMIN_PASSWORD.to_string(),
        email: None,
        full_name: Some("Администратор".to_string()),
        role: UserRole::Admin,
        technician_ref: None,
        customer_ref: None,
    }
}

/// Создать администратора, если пользователей ещё нет
pub async fn ensure_admin_user_exists() -> Result<()> {
    if repository::count_users().await? > 0 {
        return Ok(());
    }

    let admin_id = service::create(default_admin(), None).await?;
    tracing::warn!(
        "Default admin '{}' created (id {}), password '{}'. Change it after first login",
        DEFAULT_ADMIN_LOGIN,
        admin_id,
        DEFAULT_ADMIN_PASSWORD
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_admin_is_admin() {
        let dto = default_admin();
        assert_eq!(dto.role, UserRole::Admin);
        assert!(dto.password.len() >= 8);
    }
}
