//! Общий доступ компонентов к кэшу договоров и файлов

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use contracts::domain::a001_contract::aggregate::{Contract, ContractFilter, ContractStatus};
use contracts::domain::a002_contract_file::aggregate::ContractFile;
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::EventSource;

use super::api::HttpContractSource;
use super::download::{BrowserDownloader, BrowserOpener};
use super::store::{BrowserClock, ContractStore};
use super::subscription;
use crate::shared::toast::{use_toasts, ToastService};

/// Состояние кэша в сигналах Leptos и действия над ним
#[derive(Clone, Copy)]
pub struct UseContracts {
    store: StoredValue<ContractStore, LocalStorage>,
    toasts: ToastService,
    pub files: RwSignal<HashMap<String, Vec<ContractFile>>>,
    pub contracts_loading: RwSignal<bool>,
    pub files_loading: RwSignal<HashSet<String>>,
    pub downloading: RwSignal<HashSet<String>>,
}

/// Создать хранилище и подписку на изменения; вызывается в корне основного макета
pub fn provide_contracts() -> UseContracts {
    let store = ContractStore::new(
        Rc::new(HttpContractSource),
        Rc::new(BrowserDownloader),
        Rc::new(BrowserOpener),
        Rc::new(BrowserClock),
    );

    let hook = UseContracts {
        store: StoredValue::new_local(store.clone()),
        toasts: use_toasts(),
        files: RwSignal::new(HashMap::new()),
        contracts_loading: RwSignal::new(false),
        files_loading: RwSignal::new(HashSet::new()),
        downloading: RwSignal::new(HashSet::new()),
    };

    let listener_store = store.clone();
    store.subscribe(Rc::new(move || {
        hook.files.set(listener_store.files_snapshot());
        hook.contracts_loading.set(listener_store.contracts_loading());
        hook.files_loading.set(listener_store.files_loading());
        hook.downloading.set(listener_store.downloading());
    }));

    let events: StoredValue<Option<EventSource>, LocalStorage> =
        StoredValue::new_local(match subscription::subscribe(store.clone()) {
            Ok(source) => Some(source),
            Err(e) => {
                log::error!("{}", e);
                None
            }
        });
    on_cleanup(move || {
        hook.store.with_value(|store| store.clear_listeners());
        events.with_value(|source| {
            if let Some(source) = source {
                source.close();
            }
        });
    });

    provide_context(hook);
    hook
}

pub fn use_contracts() -> UseContracts {
    use_context::<UseContracts>().expect("provide_contracts() not called in MainLayout")
}

impl UseContracts {
    fn store(&self) -> ContractStore {
        self.store.get_value()
    }

    /// Загрузить список договоров по фильтру в `target`
    pub fn load(&self, filter: ContractFilter, target: RwSignal<Vec<Contract>>) {
        let store = self.store();
        let toasts = self.toasts;
        spawn_local(async move {
            match store.list(&filter).await {
                Ok(list) => target.set(list),
                Err(e) => toasts.error(format!("Не удалось загрузить договоры: {}", e)),
            }
        });
    }

    /// Загрузить файлы договора (с кэшем или принудительно)
    pub fn load_files(&self, contract_id: String, force_refresh: bool) {
        let store = self.store();
        let toasts = self.toasts;
        spawn_local(async move {
            if let Err(e) = store.get_files(&contract_id, force_refresh).await {
                toasts.error(format!("Не удалось загрузить файлы: {}", e));
            }
        });
    }

    pub fn download(&self, contract_id: String, file_id: String) {
        let store = self.store();
        let toasts = self.toasts;
        spawn_local(async move {
            if let Err(e) = store.download(&contract_id, &file_id).await {
                toasts.error(format!("Ошибка скачивания: {}", e));
            }
        });
    }

    pub fn view(&self, file_id: String) {
        let store = self.store();
        let toasts = self.toasts;
        spawn_local(async move {
            if let Err(e) = store.view(&file_id).await {
                toasts.error(format!("Не удалось открыть файл: {}", e));
            }
        });
    }

    /// Сменить статус; после успеха вызывается `on_done`
    pub fn set_status(
        &self,
        contract_id: String,
        status: ContractStatus,
        on_done: impl Fn() + 'static,
    ) {
        let store = self.store();
        let toasts = self.toasts;
        spawn_local(async move {
            match store.update_status(&contract_id, status).await {
                Ok(contract) => {
                    toasts.success(format!(
                        "{}: {}",
                        contract.base.code,
                        contract.status.label()
                    ));
                    on_done();
                }
                Err(e) => toasts.error(format!("Статус не изменён: {}", e)),
            }
        });
    }

    pub fn sync_files(&self, contract_id: String) {
        let store = self.store();
        let toasts = self.toasts;
        spawn_local(async move {
            match store.sync_files(&contract_id).await {
                Ok(result) => toasts.info(format!(
                    "Получено файлов: {}, новых: {}",
                    result.fetched, result.inserted
                )),
                Err(e) => toasts.error(format!("Синхронизация не выполнена: {}", e)),
            }
        });
    }

    pub fn invalidate(&self) {
        self.store().invalidate();
    }

    /// Файлы договора из кэша (реактивно)
    pub fn files_of(&self, contract_id: &str) -> Vec<ContractFile> {
        self.files
            .with(|map| map.get(contract_id).cloned())
            .unwrap_or_default()
    }

    pub fn is_files_loading(&self, contract_id: &str) -> bool {
        self.files_loading.with(|set| set.contains(contract_id))
    }

    pub fn is_downloading(&self, file_id: &str) -> bool {
        self.downloading.with(|set| set.contains(file_id))
    }
}
