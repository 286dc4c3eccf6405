use serde::{Deserialize, Serialize};

/// Роль пользователя
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Администратор: все дашборды и справочники
    Admin,
    /// Техник: портал с комиссиями и своими выездами
    Technician,
    /// Клиент: свои договоры и файлы
    Customer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Technician => "technician",
            UserRole::Customer => "customer",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(UserRole::Admin),
            "technician" => Some(UserRole::Technician),
            "customer" => Some(UserRole::Customer),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Admin => "Администратор",
            UserRole::Technician => "Техник",
            UserRole::Customer => "Клиент",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: UserRole,
    pub technician_ref: Option<String>,
    pub customer_ref: Option<String>,
}

impl UserInfo {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String, // user_id
    pub username: String,
    pub role: UserRole,
    #[serde(default)]
    pub technician_ref: Option<String>,
    #[serde(default)]
    pub customer_ref: Option<String>,
    pub exp: usize, // expiration timestamp
    pub iat: usize, // issued at
}

impl TokenClaims {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Может ли пользователь видеть данные клиента
    pub fn can_access_customer(&self, customer_ref: &str) -> bool {
        match self.role {
            UserRole::Admin => true,
            UserRole::Customer => self.customer_ref.as_deref() == Some(customer_ref),
            UserRole::Technician => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: UserRole, customer_ref: Option<&str>) -> TokenClaims {
        TokenClaims {
            sub: "u".into(),
            username: "u".into(),
            role,
            technician_ref: None,
            customer_ref: customer_ref.map(Into::into),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_customer_access() {
        assert!(claims(UserRole::Admin, None).can_access_customer("c-1"));
        assert!(claims(UserRole::Customer, Some("c-1")).can_access_customer("c-1"));
        assert!(!claims(UserRole::Customer, Some("c-2")).can_access_customer("c-1"));
        assert!(!claims(UserRole::Technician, None).can_access_customer("c-1"));
    }
}
