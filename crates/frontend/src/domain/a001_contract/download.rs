use async_trait::async_trait;
use gloo_net::http::{Method, Request, RequestBuilder};
use web_sys::{window, Url};

use crate::shared::api_utils::api_url;
use crate::shared::export::{click_anchor, save_bytes};

/// Стратегии скачивания файла по временной ссылке.
///
/// `Ok(false)` означает, что стратегия не дала результата и можно пробовать
/// следующую.
#[async_trait(?Send)]
pub trait FileDownloader {
    /// Клик по ссылке с атрибутом download (только same-origin)
    async fn direct(&self, url: &str, name: &str) -> Result<bool, String>;
    /// Загрузка в Blob и сохранение через object URL
    async fn blob(&self, url: &str, name: &str) -> Result<bool, String>;
}

/// Открытие ссылки в новом контексте просмотра
pub trait FileOpener {
    fn open(&self, url: &str) -> Result<(), String>;
}

pub struct BrowserDownloader;

pub struct BrowserOpener;

fn js_err(e: wasm_bindgen::JsValue) -> String {
    format!("{:?}", e)
}

/// Атрибут download работает только для ссылок того же origin
fn is_same_origin(full_url: &str) -> bool {
    let Some(page_origin) = window().and_then(|w| w.location().origin().ok()) else {
        return false;
    };
    Url::new(full_url)
        .map(|u| u.origin() == page_origin)
        .unwrap_or(false)
}

#[async_trait(?Send)]
impl FileDownloader for BrowserDownloader {
    async fn direct(&self, url: &str, name: &str) -> Result<bool, String> {
        let full = api_url(url);
        if !is_same_origin(&full) {
            return Ok(false);
        }
        // HEAD проверяет подпись и наличие файла, статус на сервере не меняется
        let probe = RequestBuilder::new(&full)
            .method(Method::HEAD)
            .send()
            .await
            .map_err(|e| format!("Probe failed: {}", e))?;
        if !probe.ok() {
            return Ok(false);
        }
        click_anchor(&full, name)?;
        Ok(true)
    }

    async fn blob(&self, url: &str, name: &str) -> Result<bool, String> {
        let response = Request::get(&api_url(url))
            .send()
            .await
            .map_err(|e| format!("Failed to send request: {}", e))?;
        if !response.ok() {
            return Err(format!("HTTP {}", response.status()));
        }
        let bytes = response
            .binary()
            .await
            .map_err(|e| format!("Failed to read file: {}", e))?;

        save_bytes(&bytes, name, None)?;
        Ok(true)
    }
}

impl FileOpener for BrowserOpener {
    fn open(&self, url: &str) -> Result<(), String> {
        let w = window().ok_or_else(|| "window is not available".to_string())?;
        match w.open_with_url_and_target(&api_url(url), "_blank") {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err("Браузер заблокировал открытие новой вкладки".into()),
            Err(e) => Err(js_err(e)),
        }
    }
}
