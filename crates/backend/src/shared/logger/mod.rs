pub mod repository;

use repository::log_event_internal;

/// Логирование бизнес-события на сервере
///
/// # Примеры
/// ```ignore
/// logger::log("contract_file", "Синхронизировано 3 файла");
/// logger::warn("esign", "Сервис подписи недоступен");
/// ```
pub fn log(category: &str, message: &str) {
    log_event_internal("server", "info", category, message);
}

pub fn warn(category: &str, message: &str) {
    log_event_internal("server", "warn", category, message);
}

pub fn error(category: &str, message: &str) {
    log_event_internal("server", "error", category, message);
}
