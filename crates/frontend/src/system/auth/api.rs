use contracts::system::auth::{
    LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, UserInfo,
};
use gloo_net::http::{Request, Response};
use serde::Serialize;

use crate::shared::api_utils::api_url;

/// POST на публичный роут auth (без токена доступа)
async fn post_public<B: Serialize>(path: &str, body: &B) -> Result<Response, String> {
    Request::post(&api_url(path))
        .json(body)
        .map_err(|e| format!("Failed to serialize request: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Failed to send request: {}", e))
}

/// Вход по логину и паролю
pub async fn login(username: String, password: String) -> Result<LoginResponse, String> {
    let response = post_public(
        "/api/system/auth/login",
        &LoginRequest { username, password },
    )
    .await?;

    match response.status() {
        200 => response
            .json::<LoginResponse>()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e)),
        401 => Err("Неверный логин или пароль".to_string()),
        status => Err(format!("Ошибка входа: HTTP {}", status)),
    }
}

/// Новый access token по refresh token
pub async fn refresh_token(refresh_token: String) -> Result<RefreshResponse, String> {
    let response = post_public("/api/system/auth/refresh", &RefreshRequest { refresh_token }).await?;
    if !response.ok() {
        return Err(format!("Refresh failed: HTTP {}", response.status()));
    }
    response
        .json::<RefreshResponse>()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}

/// Отозвать refresh token
pub async fn logout(refresh_token: String) -> Result<(), String> {
    let response = post_public("/api/system/auth/logout", &RefreshRequest { refresh_token }).await?;
    if response.ok() {
        Ok(())
    } else {
        Err(format!("Logout failed: HTTP {}", response.status()))
    }
}

/// Текущий пользователь по access token
pub async fn get_current_user(access_token: &str) -> Result<UserInfo, String> {
    let response = Request::get(&api_url("/api/system/auth/me"))
        .header("Authorization", &format!("Bearer {}", access_token))
        .send()
        .await
        .map_err(|e| format!("Failed to send request: {}", e))?;

    if !response.ok() {
        return Err(format!("Session check failed: HTTP {}", response.status()));
    }

    response
        .json::<UserInfo>()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}
