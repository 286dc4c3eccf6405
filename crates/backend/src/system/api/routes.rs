use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::handlers::{auth, users};
use crate::system::auth::middleware::{require_admin, require_auth};

/// Вход, сессия и управление пользователями
pub fn configure_system_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // публичные: выдают и отзывают токены
        .route("/api/system/auth/login", post(auth::login))
        .route("/api/system/auth/refresh", post(auth::refresh))
        .route("/api/system/auth/logout", post(auth::logout))
        .route(
            "/api/system/auth/me",
            get(auth::current_user).layer(middleware::from_fn(require_auth)),
        )
        // ========================================
        // USERS (admin)
        // ========================================
        .route(
            "/api/system/users",
            get(users::list)
                .post(users::create)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/system/users/:id",
            get(users::get_by_id)
                .put(users::update)
                .delete(users::delete)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/system/users/:id/change-password",
            post(users::change_password).layer(middleware::from_fn(require_auth)),
        )
}
