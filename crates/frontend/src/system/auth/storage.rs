//! Токены сессии в localStorage

use web_sys::{window, Storage};

const ACCESS_TOKEN_KEY: &str = "pestdesk_access_token";
const REFRESH_TOKEN_KEY: &str = "pestdesk_refresh_token";

fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok()?
}

fn write(key: &str, value: &str) {
    match local_storage() {
        Some(storage) => {
            if let Err(e) = storage.set_item(key, value) {
                log::warn!("Failed to store '{}': {:?}", key, e);
            }
        }
        None => log::warn!("localStorage is not available"),
    }
}

fn read(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok()?.filter(|v| !v.is_empty())
}

pub fn save_access_token(token: &str) {
    write(ACCESS_TOKEN_KEY, token);
}

pub fn get_access_token() -> Option<String> {
    read(ACCESS_TOKEN_KEY)
}

pub fn save_refresh_token(token: &str) {
    write(REFRESH_TOKEN_KEY, token);
}

pub fn get_refresh_token() -> Option<String> {
    read(REFRESH_TOKEN_KEY)
}

/// Удалить оба токена (выход или истёкшая сессия)
pub fn clear_tokens() {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(ACCESS_TOKEN_KEY);
        let _ = storage.remove_item(REFRESH_TOKEN_KEY);
    }
}
