use contracts::domain::a002_contract_file::aggregate::ContractFileEvent;
use leptos::task::spawn_local;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{EventSource, MessageEvent};

use super::store::ContractStore;
use crate::shared::api_utils::api_url;

/// Имя события SSE, которое отправляет backend
const EVENT_NAME: &str = "contract_file";

/// Подписка на канал изменений файлов. Каждое событие применяется к кэшу;
/// о новых файлах приходят только id, их список перечитывается.
///
/// Возвращает EventSource; его нужно закрыть при размонтировании.
pub fn subscribe(store: ContractStore) -> Result<EventSource, String> {
    let source = EventSource::new(&api_url("/api/contract_file/events"))
        .map_err(|e| format!("Failed to open event stream: {:?}", e))?;

    let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
        let Some(data) = event.data().as_string() else {
            return;
        };
        match serde_json::from_str::<ContractFileEvent>(&data) {
            Ok(event) => {
                if let Some(contract_id) = store.apply_event(&event) {
                    let store = store.clone();
                    spawn_local(async move {
                        if let Err(e) = store.get_files(&contract_id, true).await {
                            log::warn!("Failed to reload files of {}: {}", contract_id, e);
                        }
                    });
                }
            }
            Err(e) => log::warn!("Skipping malformed contract file event: {}", e),
        }
    });
    source
        .add_event_listener_with_callback(EVENT_NAME, on_message.as_ref().unchecked_ref())
        .map_err(|e| format!("Failed to subscribe: {:?}", e))?;
    on_message.forget();

    let on_error = Closure::<dyn FnMut(web_sys::Event)>::new(|_| {
        // EventSource переподключается сам
        log::warn!("Contract file event stream interrupted");
    });
    source.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    on_error.forget();

    Ok(source)
}
