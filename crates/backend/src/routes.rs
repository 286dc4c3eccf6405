use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, system};
use system::auth::middleware::{require_admin, require_auth};

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .merge(system::api::routes::configure_system_routes())
        // ========================================
        // A001 CONTRACTS
        // ========================================
        .route(
            "/api/contract",
            get(handlers::a001_contract::list)
                .layer(middleware::from_fn(require_auth))
                .merge(post(handlers::a001_contract::upsert).layer(middleware::from_fn(require_admin))),
        )
        .route(
            "/api/contract/:id",
            get(handlers::a001_contract::get_by_id)
                .layer(middleware::from_fn(require_auth))
                .merge(delete(handlers::a001_contract::delete).layer(middleware::from_fn(require_admin))),
        )
        .route(
            "/api/contract/:id/status",
            post(handlers::a001_contract::set_status).layer(middleware::from_fn(require_admin)),
        )
        // ========================================
        // A002 CONTRACT FILES
        // ========================================
        .route(
            "/api/contract/:id/files",
            get(handlers::a002_contract_file::list_files).layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/contract/:id/files/sync",
            post(handlers::a002_contract_file::sync).layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/contract_file/:id/link",
            post(handlers::a002_contract_file::create_link).layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/contract_file/:id/confirm",
            post(handlers::a002_contract_file::confirm).layer(middleware::from_fn(require_auth)),
        )
        // Доступ по подписанной ссылке, без заголовка Authorization
        .route(
            "/api/contract_file/:id/content",
            get(handlers::a002_contract_file::content)
                .head(handlers::a002_contract_file::content_head),
        )
        .route(
            "/api/contract_file/events",
            get(handlers::a002_contract_file::events),
        )
        // ========================================
        // REFERENCE DATA (admin only)
        // ========================================
        .route(
            "/api/customer",
            get(handlers::a003_customer::list_all)
                .post(handlers::a003_customer::upsert)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/customer/:id",
            get(handlers::a003_customer::get_by_id)
                .delete(handlers::a003_customer::delete)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/technician",
            get(handlers::a004_technician::list_all)
                .post(handlers::a004_technician::upsert)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/technician/:id",
            get(handlers::a004_technician::get_by_id)
                .delete(handlers::a004_technician::delete)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/service_case",
            get(handlers::a005_service_case::list)
                .post(handlers::a005_service_case::upsert)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/service_case/:id",
            get(handlers::a005_service_case::get_by_id)
                .delete(handlers::a005_service_case::delete)
                .layer(middleware::from_fn(require_admin)),
        )
        // ========================================
        // DASHBOARDS
        // ========================================
        .route(
            "/api/d400/economics",
            get(handlers::dashboards::economics).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/d401/billing",
            get(handlers::dashboards::billing).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/d401/billing/export",
            get(handlers::dashboards::billing_export).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/d402/pipeline",
            get(handlers::dashboards::pipeline).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/d403/ranking",
            get(handlers::dashboards::ranking).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/d404/portal",
            get(handlers::dashboards::portal).layer(middleware::from_fn(require_auth)),
        )
        // ========================================
        // UTILITIES
        // ========================================
        .route(
            "/api/logs",
            get(handlers::logs::list_all)
                .post(handlers::logs::create)
                .delete(handlers::logs::clear_all)
                .layer(middleware::from_fn(require_admin)),
        )
}
