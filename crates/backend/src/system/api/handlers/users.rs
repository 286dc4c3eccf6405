use axum::{
    extract::{Json, Path},
    http::StatusCode,
};
use contracts::system::users::{ChangePasswordDto, CreateUserDto, UpdateUserDto, User};

use crate::shared::error::log_status;
use crate::system::auth::extractor::CurrentUser;
use crate::system::users::service;

/// GET /api/system/users
pub async fn list(CurrentUser(_claims): CurrentUser) -> Result<Json<Vec<User>>, StatusCode> {
    let users = service::list_all()
        .await
        .map_err(|e| log_status("Failed to list users", e))?;

    Ok(Json(users))
}

/// GET /api/system/users/:id
pub async fn get_by_id(
    CurrentUser(_claims): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<User>, StatusCode> {
    let user = service::get_by_id(&id)
        .await
        .map_err(|e| log_status("Failed to load user", e))?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(user))
}

/// POST /api/system/users
pub async fn create(
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<CreateUserDto>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let user_id = service::create(dto, Some(claims.sub))
        .await
        .map_err(|e| log_status("Failed to create user", e))?;

    Ok(Json(serde_json::json!({"id": user_id})))
}

/// PUT /api/system/users/:id
pub async fn update(
    CurrentUser(_claims): CurrentUser,
    Path(id): Path<String>,
    Json(mut dto): Json<UpdateUserDto>,
) -> Result<StatusCode, StatusCode> {
    dto.id = id;

    service::update(dto)
        .await
        .map_err(|e| log_status("Failed to update user", e))?;

    Ok(StatusCode::OK)
}

/// DELETE /api/system/users/:id; удалить свою учётную запись нельзя
pub async fn delete(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    if claims.sub == id {
        tracing::warn!("User '{}' tried to delete own account", claims.username);
        return Err(StatusCode::BAD_REQUEST);
    }
    let deleted = service::delete(&id)
        .await
        .map_err(|e| log_status("Failed to delete user", e))?;

    if deleted {
        Ok(StatusCode::OK)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

/// POST /api/system/users/:id/change-password
pub async fn change_password(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(mut dto): Json<ChangePasswordDto>,
) -> Result<StatusCode, StatusCode> {
    dto.user_id = id;

    service::change_password(dto, &claims.sub)
        .await
        .map_err(|e| log_status("Failed to change password", e))?;

    Ok(StatusCode::OK)
}
