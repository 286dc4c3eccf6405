use crate::system::auth::{UserInfo, UserRole};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub role: UserRole,
    pub technician_ref: Option<String>,
    pub customer_ref: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub last_login_at: Option<String>,
    pub created_by: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        UserInfo {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            role: user.role,
            technician_ref: user.technician_ref,
            customer_ref: user.customer_ref,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserDto {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub technician_ref: Option<String>,
    #[serde(default)]
    pub customer_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserDto {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub role: UserRole,
    #[serde(default)]
    pub technician_ref: Option<String>,
    #[serde(default)]
    pub customer_ref: Option<String>,
}

/// Проверка согласованности роли и ссылок на справочники
pub fn validate_role_refs(
    role: UserRole,
    technician_ref: &Option<String>,
    customer_ref: &Option<String>,
) -> Result<(), String> {
    let has = |v: &Option<String>| v.as_ref().map(|s| !s.trim().is_empty()).unwrap_or(false);
    match role {
        UserRole::Technician if !has(technician_ref) => {
            Err("Для роли техника требуется ссылка на техника".into())
        }
        UserRole::Customer if !has(customer_ref) => {
            Err("Для роли клиента требуется ссылка на клиента".into())
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordDto {
    pub user_id: String,
    pub old_password: Option<String>, // None, если администратор меняет чужой пароль
    pub new_password: String,
}
