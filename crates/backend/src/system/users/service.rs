use anyhow::Result;
use chrono::Utc;
use contracts::system::users::{validate_role_refs, ChangePasswordDto, CreateUserDto, UpdateUserDto, User};

use super::repository;
use crate::shared::error::DomainError;
use crate::system::auth::password;

fn validate_email(email: &Option<String>) -> Result<(), DomainError> {
    match email {
        Some(e) if !e.trim().is_empty() && !e.contains('@') => {
            Err(DomainError::Validation("Invalid email format".into()))
        }
        _ => Ok(()),
    }
}

/// Create a new user
pub async fn create(dto: CreateUserDto, created_by: Option<String>) -> Result<String> {
    if dto.username.trim().is_empty() {
        return Err(DomainError::validation("Username cannot be empty"));
    }

    if repository::get_by_username(&dto.username).await?.is_some() {
        return Err(DomainError::validation("Username already exists"));
    }

    validate_email(&dto.email)?;
    validate_role_refs(dto.role, &dto.technician_ref, &dto.customer_ref)
        .map_err(DomainError::Validation)?;
    password::validate_password_strength(&dto.password)?;

    let password_hash = password::hash_password(&dto.password)?;

    let user_id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let user = User {
        id: user_id.clone(),
        username: dto.username,
        email: dto.email,
        full_name: dto.full_name,
        is_active: true,
        role: dto.role,
        technician_ref: dto.technician_ref,
        customer_ref: dto.customer_ref,
        created_at: now.clone(),
        updated_at: now,
        last_login_at: None,
        created_by,
    };

    repository::create_with_password(&user, &password_hash).await?;
    tracing::info!("User {} created with role {}", user.username, user.role.as_str());

    Ok(user_id)
}

/// Update user
pub async fn update(dto: UpdateUserDto) -> Result<()> {
    let mut user = repository::get_by_id(&dto.id)
        .await?
        .ok_or(DomainError::NotFound("User"))?;

    validate_email(&dto.email)?;
    validate_role_refs(dto.role, &dto.technician_ref, &dto.customer_ref)
        .map_err(DomainError::Validation)?;

    user.email = dto.email;
    user.full_name = dto.full_name;
    user.is_active = dto.is_active;
    user.role = dto.role;
    user.technician_ref = dto.technician_ref;
    user.customer_ref = dto.customer_ref;
    user.updated_at = Utc::now().to_rfc3339();

    repository::update(&user).await?;

    Ok(())
}

/// Delete user
pub async fn delete(id: &str) -> Result<bool> {
    repository::delete(id).await
}

/// Get user by ID
pub async fn get_by_id(id: &str) -> Result<Option<User>> {
    repository::get_by_id(id).await
}

/// List all users
pub async fn list_all() -> Result<Vec<User>> {
    repository::list_all().await
}

/// Change user password
pub async fn change_password(dto: ChangePasswordDto, requester_id: &str) -> Result<()> {
    repository::get_by_id(&dto.user_id)
        .await?
        .ok_or(DomainError::NotFound("User"))?;

    let requester = repository::get_by_id(requester_id)
        .await?
        .ok_or(DomainError::NotFound("Requester"))?;

    if dto.user_id != requester_id {
        // Чужой пароль меняет только администратор, без старого пароля
        if !requester.is_admin() {
            return Err(DomainError::Forbidden.into());
        }
    } else {
        let old_password = dto
            .old_password
            .as_deref()
            .ok_or_else(|| DomainError::Validation("Old password is required".into()))?;
        let current_hash = repository::get_password_hash(&dto.user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Password hash not found"))?;

        if !password::verify_password(old_password, &current_hash)? {
            return Err(DomainError::validation("Invalid old password"));
        }
    }

    password::validate_password_strength(&dto.new_password)?;
    let new_hash = password::hash_password(&dto.new_password)?;
    repository::update_password(&dto.user_id, &new_hash).await?;

    Ok(())
}

/// Verify user credentials (for login)
pub async fn verify_credentials(username: &str, password: &str) -> Result<Option<User>> {
    let user = match repository::get_by_username(username).await? {
        Some(u) => u,
        None => return Ok(None),
    };

    if !user.is_active {
        return Err(anyhow::anyhow!("User account is inactive"));
    }

    let password_hash = repository::get_password_hash(&user.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Password hash not found"))?;

    if !password::verify_password(password, &password_hash)? {
        return Ok(None);
    }

    if let Err(e) = repository::update_last_login(&user.id).await {
        tracing::warn!("Failed to update last login for {}: {}", user.username, e);
    }

    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email(&None).is_ok());
        assert!(validate_email(&Some("".into())).is_ok());
        assert!(validate_email(&Some("a@b.ru".into())).is_ok());
        assert!(validate_email(&Some("nope".into())).is_err());
    }
}
