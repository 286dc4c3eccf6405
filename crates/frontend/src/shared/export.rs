//! Сохранение файлов из браузера: клик по временной ссылке и Blob
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// Кликнуть по временной скрытой ссылке с атрибутом download
pub fn click_anchor(href: &str, filename: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("No window object")?;
    let document = window.document().ok_or("No document object")?;
    let body = document.body().ok_or("No body element")?;

    let anchor = document
        .create_element("a")
        .map_err(|e| format!("Failed to create anchor: {:?}", e))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|e| format!("Failed to cast to anchor: {:?}", e))?;

    anchor.set_href(href);
    anchor.set_download(filename);
    anchor.set_rel("noopener");
    anchor
        .style()
        .set_property("display", "none")
        .map_err(|e| format!("Failed to set style: {:?}", e))?;

    body.append_child(&anchor)
        .map_err(|e| format!("Failed to append anchor: {:?}", e))?;
    anchor.click();
    body.remove_child(&anchor)
        .map_err(|e| format!("Failed to remove anchor: {:?}", e))?;
    Ok(())
}

/// Сохранить байты как файл через object URL
pub fn save_bytes(bytes: &[u8], filename: &str, mime: Option<&str>) -> Result<(), String> {
    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(bytes));

    let blob = match mime {
        Some(mime) => {
            let properties = BlobPropertyBag::new();
            properties.set_type(mime);
            Blob::new_with_u8_array_sequence_and_options(&parts, &properties)
        }
        None => Blob::new_with_u8_array_sequence(&parts),
    }
    .map_err(|e| format!("Failed to create blob: {:?}", e))?;

    let url = Url::create_object_url_with_blob(&blob)
        .map_err(|e| format!("Failed to create object URL: {:?}", e))?;
    let clicked = click_anchor(&url, filename);
    Url::revoke_object_url(&url).map_err(|e| format!("Failed to revoke URL: {:?}", e))?;
    clicked
}
