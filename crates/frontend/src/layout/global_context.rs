use leptos::prelude::*;
use serde::{Deserialize, Serialize};
use web_sys::window;

/// Параметры адресной строки приложения
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct PageQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    page: Option<String>,
}

/// Ключ страницы из query-строки ("?page=...")
pub fn page_from_search(search: &str) -> Option<String> {
    serde_qs::from_str::<PageQuery>(search.trim_start_matches('?'))
        .ok()
        .and_then(|q| q.page)
        .filter(|p| !p.is_empty())
}

/// Query-строка для ключа страницы
pub fn search_for_page(page: &str) -> String {
    let query = PageQuery {
        page: Some(page.to_string()),
    };
    format!("?{}", serde_qs::to_string(&query).unwrap_or_default())
}

#[derive(Clone, Copy)]
pub struct AppGlobalContext {
    /// Ключ открытой страницы
    pub page: RwSignal<Option<String>>,
    pub sidebar_open: RwSignal<bool>,
}

impl AppGlobalContext {
    pub fn new() -> Self {
        Self {
            page: RwSignal::new(None),
            sidebar_open: RwSignal::new(true),
        }
    }

    /// Связать открытую страницу с параметром `?page=` адресной строки
    pub fn init_router_integration(&self) {
        let search = window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        if let Some(page) = page_from_search(&search) {
            self.page.set(Some(page));
        }

        let this = *self;
        Effect::new(move |_| {
            let Some(page) = this.page.get() else {
                return;
            };
            let new_url = search_for_page(&page);
            let current_search = window()
                .and_then(|w| w.location().search().ok())
                .unwrap_or_default();
            if current_search == new_url {
                return;
            }
            if let Some(history) = window().and_then(|w| w.history().ok()) {
                let _ = history.replace_state_with_url(
                    &wasm_bindgen::JsValue::NULL,
                    "",
                    Some(&new_url),
                );
            }
        });
    }

    pub fn open_page(&self, key: &str) {
        log::debug!("open page '{}'", key);
        self.page.set(Some(key.to_string()));
    }

    pub fn toggle_sidebar(&self) {
        self.sidebar_open.update(|v| *v = !*v);
    }
}

impl Default for AppGlobalContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_round_trip() {
        assert_eq!(
            page_from_search("?page=d400_economics").as_deref(),
            Some("d400_economics")
        );
        assert_eq!(page_from_search(""), None);
        assert_eq!(page_from_search("?page="), None);
        assert_eq!(search_for_page("a001_contract"), "?page=a001_contract");
    }
}
