//! Кэш договоров и файлов договоров
//!
//! Списки договоров кэшируются по ключу фильтра, списки файлов по id договора.
//! Запись считается свежей `ttl_ms` миллисекунд после загрузки. Параллельные
//! запросы с одним ключом ждут один и тот же сетевой вызов.
//!
//! Состояние однопоточное (цикл событий браузера): `Rc<RefCell<..>>`,
//! изменяется только методами хранилища.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use contracts::domain::a001_contract::aggregate::{Contract, ContractFilter, ContractStatus};
use contracts::domain::a002_contract_file::aggregate::{
    dedup_by_external_id, ContractFile, ContractFileEvent, DownloadStatus, FileDisposition,
    FileSyncResult,
};
use futures::future::{LocalBoxFuture, Shared};
use futures::FutureExt;

use super::api::ContractSource;
use super::download::{FileDownloader, FileOpener};

/// Время жизни записи кэша по умолчанию: 5 минут
pub const DEFAULT_TTL_MS: f64 = 5.0 * 60.0 * 1000.0;

/// Текущее время в миллисекундах
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Часы браузера
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

type SharedFetch<T> = Shared<LocalBoxFuture<'static, Result<T, String>>>;

struct CacheEntry<T> {
    value: T,
    fetched_at: f64,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, now: f64, ttl: f64) -> bool {
        now - self.fetched_at < ttl
    }
}

struct InFlight<T> {
    generation: u64,
    fetch: SharedFetch<T>,
}

#[derive(Default)]
struct StoreState {
    contracts: HashMap<String, CacheEntry<Vec<Contract>>>,
    files: HashMap<String, CacheEntry<Vec<ContractFile>>>,
    contracts_in_flight: HashMap<String, InFlight<Vec<Contract>>>,
    files_in_flight: HashMap<String, InFlight<Vec<ContractFile>>>,
    downloading: HashSet<String>,
    generation: u64,
}

impl StoreState {
    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn find_file_mut(&mut self, contract_id: &str, file_id: &str) -> Option<&mut ContractFile> {
        self.files
            .get_mut(contract_id)?
            .value
            .iter_mut()
            .find(|f| f.id == file_id)
    }

    fn set_file_status(&mut self, contract_id: &str, file_id: &str, status: DownloadStatus) {
        if let Some(file) = self.find_file_mut(contract_id, file_id) {
            file.download_status = status;
        }
    }

    /// Добавить или заменить файл в кэше договора.
    /// Первое вхождение внешнего id остаётся, повтор под другим id отбрасывается.
    fn upsert_file(&mut self, file: &ContractFile) -> bool {
        let Some(entry) = self.files.get_mut(&file.contract_id) else {
            return false;
        };
        let files = &mut entry.value;
        if let Some(existing) = files.iter_mut().find(|f| f.id == file.id) {
            if existing == file {
                return false;
            }
            *existing = file.clone();
            return true;
        }
        if files
            .iter()
            .any(|f| f.external_file_id == file.external_file_id)
        {
            return false;
        }
        files.push(file.clone());
        true
    }

    /// Применить событие к кэшу файлов
    fn apply_event(&mut self, event: &ContractFileEvent) -> EventEffect {
        let Some(entry) = self.files.get_mut(event.contract_id()) else {
            return EventEffect::Unchanged;
        };
        let files = &mut entry.value;
        match event {
            ContractFileEvent::Added { file_id, .. } => {
                if files.iter().any(|f| &f.id == file_id) {
                    EventEffect::Unchanged
                } else {
                    EventEffect::Refetch
                }
            }
            ContractFileEvent::StatusChanged {
                file_id,
                status,
                downloaded_at,
                size,
                ..
            } => {
                let Some(file) = files.iter_mut().find(|f| &f.id == file_id) else {
                    return EventEffect::Unchanged;
                };
                let before = file.clone();
                file.download_status = *status;
                if downloaded_at.is_some() {
                    file.downloaded_at = *downloaded_at;
                }
                if let Some(size) = size {
                    file.size = *size;
                }
                EventEffect::changed(*file != before)
            }
            ContractFileEvent::Removed { file_id, .. } => {
                let before = files.len();
                files.retain(|f| &f.id != file_id);
                EventEffect::changed(files.len() != before)
            }
        }
    }
}

/// Результат применения события к кэшу
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventEffect {
    Unchanged,
    Changed,
    /// В кэше договора нет нового файла, список нужно перечитать
    Refetch,
}

impl EventEffect {
    fn changed(changed: bool) -> Self {
        if changed {
            EventEffect::Changed
        } else {
            EventEffect::Unchanged
        }
    }
}

struct StoreInner {
    source: Rc<dyn ContractSource>,
    downloader: Rc<dyn FileDownloader>,
    opener: Rc<dyn FileOpener>,
    clock: Rc<dyn Clock>,
    ttl_ms: f64,
    state: RefCell<StoreState>,
    listeners: RefCell<Vec<Rc<dyn Fn()>>>,
    notifying: Cell<bool>,
}

/// Хранилище состояния договоров и файлов
#[derive(Clone)]
pub struct ContractStore {
    inner: Rc<StoreInner>,
}

impl ContractStore {
    pub fn new(
        source: Rc<dyn ContractSource>,
        downloader: Rc<dyn FileDownloader>,
        opener: Rc<dyn FileOpener>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self::with_ttl(source, downloader, opener, clock, DEFAULT_TTL_MS)
    }

    pub fn with_ttl(
        source: Rc<dyn ContractSource>,
        downloader: Rc<dyn FileDownloader>,
        opener: Rc<dyn FileOpener>,
        clock: Rc<dyn Clock>,
        ttl_ms: f64,
    ) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                source,
                downloader,
                opener,
                clock,
                ttl_ms,
                state: RefCell::new(StoreState::default()),
                listeners: RefCell::new(Vec::new()),
                notifying: Cell::new(false),
            }),
        }
    }

    /// Подписаться на изменения кэша и флагов загрузки
    pub fn subscribe(&self, listener: Rc<dyn Fn()>) {
        self.inner.listeners.borrow_mut().push(listener);
    }

    /// Отписать всех слушателей (при размонтировании)
    pub fn clear_listeners(&self) {
        self.inner.listeners.borrow_mut().clear();
    }

    fn notify(&self) {
        // слушатель может сам вызвать методы хранилища
        if self.inner.notifying.replace(true) {
            return;
        }
        let listeners: Vec<Rc<dyn Fn()>> = self.inner.listeners.borrow().clone();
        for listener in listeners {
            listener();
        }
        self.inner.notifying.set(false);
    }

    // ------------------------------------------------------------------
    // Флаги загрузки
    // ------------------------------------------------------------------

    pub fn contracts_loading(&self) -> bool {
        !self.inner.state.borrow().contracts_in_flight.is_empty()
    }

    pub fn files_loading(&self) -> HashSet<String> {
        self.inner
            .state
            .borrow()
            .files_in_flight
            .keys()
            .cloned()
            .collect()
    }

    pub fn downloading(&self) -> HashSet<String> {
        self.inner.state.borrow().downloading.clone()
    }

    /// Файлы договора из кэша без обращения к сети (даже устаревшие)
    pub fn cached_files(&self, contract_id: &str) -> Option<Vec<ContractFile>> {
        self.inner
            .state
            .borrow()
            .files
            .get(contract_id)
            .map(|e| e.value.clone())
    }

    /// Снимок всех закэшированных файлов по договорам
    pub fn files_snapshot(&self) -> HashMap<String, Vec<ContractFile>> {
        self.inner
            .state
            .borrow()
            .files
            .iter()
            .map(|(k, e)| (k.clone(), e.value.clone()))
            .collect()
    }

    /// Статус загрузки файла в кэше
    pub fn file_status(&self, contract_id: &str, file_id: &str) -> Option<DownloadStatus> {
        self.inner
            .state
            .borrow()
            .files
            .get(contract_id)?
            .value
            .iter()
            .find(|f| f.id == file_id)
            .map(|f| f.download_status)
    }

    // ------------------------------------------------------------------
    // Договоры
    // ------------------------------------------------------------------

    /// Список договоров по фильтру: из кэша, если запись свежая, иначе из сети
    pub async fn list(&self, filter: &ContractFilter) -> Result<Vec<Contract>, String> {
        let filter = filter.normalized();
        let key = filter.cache_key();
        let (generation, fetch, started) = {
            let mut state = self.inner.state.borrow_mut();
            let now = self.inner.clock.now_ms();
            if let Some(entry) = state.contracts.get(&key) {
                if entry.is_fresh(now, self.inner.ttl_ms) {
                    return Ok(entry.value.clone());
                }
            }
            if let Some(flight) = state.contracts_in_flight.get(&key) {
                (flight.generation, flight.fetch.clone(), false)
            } else {
                let generation = state.next_generation();
                let source = self.inner.source.clone();
                let fetch = async move { source.list_contracts(&filter).await }
                    .boxed_local()
                    .shared();
                state.contracts_in_flight.insert(
                    key.clone(),
                    InFlight {
                        generation,
                        fetch: fetch.clone(),
                    },
                );
                (generation, fetch, true)
            }
        };
        if started {
            self.notify();
        }

        let result = fetch.await;

        let committed = {
            let mut state = self.inner.state.borrow_mut();
            let current = state
                .contracts_in_flight
                .get(&key)
                .map(|f| f.generation == generation)
                .unwrap_or(false);
            if current {
                state.contracts_in_flight.remove(&key);
                if let Ok(contracts) = &result {
                    let fetched_at = self.inner.clock.now_ms();
                    state.contracts.insert(
                        key.clone(),
                        CacheEntry {
                            value: contracts.clone(),
                            fetched_at,
                        },
                    );
                }
            }
            current
        };
        if committed {
            if let Err(e) = &result {
                log::error!("Failed to load contracts ({}): {}", key, e);
            }
            self.notify();
        }
        result
    }

    /// Сменить статус договора; все закэшированные списки договоров сбрасываются
    pub async fn update_status(
        &self,
        contract_id: &str,
        status: ContractStatus,
    ) -> Result<Contract, String> {
        match self.inner.source.update_status(contract_id, status).await {
            Ok(contract) => {
                {
                    let mut state = self.inner.state.borrow_mut();
                    state.contracts.clear();
                    state.contracts_in_flight.clear();
                }
                self.notify();
                Ok(contract)
            }
            Err(e) => {
                log::error!("Failed to update contract {} status: {}", contract_id, e);
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Файлы
    // ------------------------------------------------------------------

    /// Файлы договора.
    ///
    /// `force_refresh` игнорирует срок жизни, всегда выполняет новый запрос
    /// и предварительно удаляет записи договора из кэша.
    pub async fn get_files(
        &self,
        contract_id: &str,
        force_refresh: bool,
    ) -> Result<Vec<ContractFile>, String> {
        let (generation, fetch) = {
            let mut state = self.inner.state.borrow_mut();
            let joined = if force_refresh {
                state.files.remove(contract_id);
                None
            } else {
                let now = self.inner.clock.now_ms();
                if let Some(entry) = state.files.get(contract_id) {
                    if entry.is_fresh(now, self.inner.ttl_ms) {
                        return Ok(entry.value.clone());
                    }
                }
                state
                    .files_in_flight
                    .get(contract_id)
                    .map(|f| (f.generation, f.fetch.clone()))
            };
            match joined {
                Some(flight) => flight,
                None => {
                    let generation = state.next_generation();
                    let source = self.inner.source.clone();
                    let id = contract_id.to_string();
                    let fetch = async move {
                        source
                            .list_files(&id)
                            .await
                            .map(dedup_by_external_id)
                    }
                    .boxed_local()
                    .shared();
                    // новый запрос заменяет предыдущий незавершённый
                    state.files_in_flight.insert(
                        contract_id.to_string(),
                        InFlight {
                            generation,
                            fetch: fetch.clone(),
                        },
                    );
                    (generation, fetch)
                }
            }
        };
        self.notify();

        let result = fetch.await;

        let committed = {
            let mut state = self.inner.state.borrow_mut();
            let current = state
                .files_in_flight
                .get(contract_id)
                .map(|f| f.generation == generation)
                .unwrap_or(false);
            if current {
                state.files_in_flight.remove(contract_id);
                if let Ok(files) = &result {
                    let fetched_at = self.inner.clock.now_ms();
                    state.files.insert(
                        contract_id.to_string(),
                        CacheEntry {
                            value: files.clone(),
                            fetched_at,
                        },
                    );
                }
            }
            current
        };
        if committed {
            if let Err(e) = &result {
                log::error!("Failed to load files of contract {}: {}", contract_id, e);
            }
            self.notify();
        }
        result
    }

    /// Зеркалировать файлы из сервиса подписи и перечитать список
    pub async fn sync_files(&self, contract_id: &str) -> Result<FileSyncResult, String> {
        let sync = self.inner.source.sync_files(contract_id).await.map_err(|e| {
            log::error!("Failed to sync files of contract {}: {}", contract_id, e);
            e
        })?;
        self.get_files(contract_id, true).await?;
        Ok(sync)
    }

    /// Скачать файл.
    ///
    /// Сначала прямая ссылка, при отсутствии результата загрузка через Blob.
    /// После успеха файл сразу помечается загруженным, сервер получает
    /// подтверждение; его событие применяется идемпотентно.
    pub async fn download(&self, contract_id: &str, file_id: &str) -> Result<(), String> {
        let name = {
            let mut state = self.inner.state.borrow_mut();
            state.downloading.insert(file_id.to_string());
            state.set_file_status(contract_id, file_id, DownloadStatus::Downloading);
            state
                .find_file_mut(contract_id, file_id)
                .map(|f| f.name.clone())
                .unwrap_or_else(|| file_id.to_string())
        };
        self.notify();

        let outcome = self.fetch_attachment(file_id, &name).await;

        match &outcome {
            Ok(()) => {
                {
                    let now = self.inner.clock.now_ms();
                    let mut state = self.inner.state.borrow_mut();
                    if let Some(file) = state.find_file_mut(contract_id, file_id) {
                        file.download_status = DownloadStatus::Completed;
                        file.downloaded_at =
                            DateTime::<Utc>::from_timestamp_millis(now as i64).or(file.downloaded_at);
                    }
                    state.downloading.remove(file_id);
                }
                self.notify();

                match self.inner.source.confirm_download(file_id).await {
                    Ok(file) => {
                        let changed = self.inner.state.borrow_mut().upsert_file(&file);
                        if changed {
                            self.notify();
                        }
                    }
                    Err(e) => log::warn!("Download of {} not confirmed: {}", file_id, e),
                }
            }
            Err(e) => {
                log::error!("Failed to download file {}: {}", file_id, e);
                {
                    let mut state = self.inner.state.borrow_mut();
                    state.set_file_status(contract_id, file_id, DownloadStatus::Failed);
                    state.downloading.remove(file_id);
                }
                self.notify();
            }
        }
        outcome
    }

    async fn fetch_attachment(&self, file_id: &str, name: &str) -> Result<(), String> {
        let link = self
            .inner
            .source
            .file_link(file_id, FileDisposition::Attachment)
            .await?;
        match self.inner.downloader.direct(&link.url, name).await {
            Ok(true) => return Ok(()),
            Ok(false) => log::debug!("Direct download of {} unavailable, using blob", file_id),
            Err(e) => log::warn!("Direct download of {} failed: {}", file_id, e),
        }
        match self.inner.downloader.blob(&link.url, name).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(format!("Не удалось скачать файл {}", name)),
            Err(e) => Err(e),
        }
    }

    /// Открыть файл для просмотра в новой вкладке; статус загрузки не меняется
    pub async fn view(&self, file_id: &str) -> Result<(), String> {
        let link = self
            .inner
            .source
            .file_link(file_id, FileDisposition::Inline)
            .await
            .map_err(|e| {
                log::error!("Failed to get view link for {}: {}", file_id, e);
                e
            })?;
        self.inner.opener.open(&link.url)
    }

    /// Применить событие канала изменений. Неизвестные договоры игнорируются.
    ///
    /// Возвращает id договора, если в его кэше нет добавленного файла:
    /// событие несёт только идентификаторы, список нужно перечитать
    /// через `get_files(contract_id, true)`.
    pub fn apply_event(&self, event: &ContractFileEvent) -> Option<String> {
        let effect = self.inner.state.borrow_mut().apply_event(event);
        match effect {
            EventEffect::Unchanged => None,
            EventEffect::Changed => {
                self.notify();
                None
            }
            EventEffect::Refetch => Some(event.contract_id().to_string()),
        }
    }

    /// Сбросить все записи кэша
    pub fn invalidate(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            state.contracts.clear();
            state.files.clear();
            state.contracts_in_flight.clear();
            state.files_in_flight.clear();
        }
        self.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use contracts::domain::a001_contract::aggregate::{ContractDto, ContractKind};
    use contracts::domain::a002_contract_file::aggregate::{ContractFileKind, FileLink};
    use futures::executor::block_on;
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Future, который один раз возвращает Pending
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();
        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    fn file(id: &str, contract_id: &str, external: &str) -> ContractFile {
        ContractFile {
            id: id.into(),
            contract_id: contract_id.into(),
            external_file_id: external.into(),
            name: format!("{}.pdf", id),
            kind: ContractFileKind::Pdf,
            download_status: DownloadStatus::Pending,
            size: 100,
            downloaded_at: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn contract(code: &str) -> Contract {
        let dto = ContractDto {
            id: None,
            code: None,
            description: format!("Договор {}", code),
            comment: None,
            kind: ContractKind::Contract,
            total_value: 1000.0,
            customer_ref: "cust-1".into(),
            external_ref: None,
            valid_until: None,
        };
        Contract::new_for_insert(&dto, code.into())
    }

    #[derive(Default)]
    struct FakeSource {
        list_calls: Cell<u32>,
        files_calls: Cell<u32>,
        confirm_calls: Cell<u32>,
        files: RefCell<Vec<ContractFile>>,
        fail_link: Cell<bool>,
    }

    #[async_trait(?Send)]
    impl ContractSource for FakeSource {
        async fn list_contracts(&self, _filter: &ContractFilter) -> Result<Vec<Contract>, String> {
            self.list_calls.set(self.list_calls.get() + 1);
            YieldOnce(false).await;
            Ok(vec![contract("C-1")])
        }

        async fn list_files(&self, _contract_id: &str) -> Result<Vec<ContractFile>, String> {
            self.files_calls.set(self.files_calls.get() + 1);
            let files = self.files.borrow().clone();
            YieldOnce(false).await;
            Ok(files)
        }

        async fn file_link(
            &self,
            file_id: &str,
            disposition: FileDisposition,
        ) -> Result<FileLink, String> {
            if self.fail_link.get() {
                return Err("link refused".into());
            }
            Ok(FileLink {
                url: format!("/files/{}?d={}", file_id, disposition.as_str()),
                expires_at: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            })
        }

        async fn confirm_download(&self, file_id: &str) -> Result<ContractFile, String> {
            self.confirm_calls.set(self.confirm_calls.get() + 1);
            let mut f = self
                .files
                .borrow()
                .iter()
                .find(|f| f.id == file_id)
                .cloned()
                .ok_or_else(|| "not found".to_string())?;
            f.download_status = DownloadStatus::Completed;
            Ok(f)
        }

        async fn update_status(
            &self,
            _contract_id: &str,
            status: ContractStatus,
        ) -> Result<Contract, String> {
            let mut c = contract("C-1");
            c.status = status;
            Ok(c)
        }

        async fn sync_files(&self, _contract_id: &str) -> Result<FileSyncResult, String> {
            Ok(FileSyncResult::default())
        }
    }

    /// Результаты стратегий: (direct, blob)
    struct FakeDownloader {
        direct: Result<bool, String>,
        blob: Result<bool, String>,
        blob_calls: Cell<u32>,
    }

    impl FakeDownloader {
        fn new(direct: Result<bool, String>, blob: Result<bool, String>) -> Self {
            Self {
                direct,
                blob,
                blob_calls: Cell::new(0),
            }
        }
    }

    #[async_trait(?Send)]
    impl FileDownloader for FakeDownloader {
        async fn direct(&self, _url: &str, _name: &str) -> Result<bool, String> {
            self.direct.clone()
        }

        async fn blob(&self, _url: &str, _name: &str) -> Result<bool, String> {
            self.blob_calls.set(self.blob_calls.get() + 1);
            self.blob.clone()
        }
    }

    #[derive(Default)]
    struct FakeOpener {
        opened: RefCell<Vec<String>>,
    }

    impl FileOpener for FakeOpener {
        fn open(&self, url: &str) -> Result<(), String> {
            self.opened.borrow_mut().push(url.to_string());
            Ok(())
        }
    }

    struct FakeClock(Cell<f64>);

    impl Clock for FakeClock {
        fn now_ms(&self) -> f64 {
            self.0.get()
        }
    }

    struct Fixture {
        source: Rc<FakeSource>,
        downloader: Rc<FakeDownloader>,
        opener: Rc<FakeOpener>,
        clock: Rc<FakeClock>,
        store: ContractStore,
    }

    fn fixture_with(downloader: FakeDownloader) -> Fixture {
        let source = Rc::new(FakeSource::default());
        let downloader = Rc::new(downloader);
        let opener = Rc::new(FakeOpener::default());
        let clock = Rc::new(FakeClock(Cell::new(1_000.0)));
        let store = ContractStore::new(
            source.clone(),
            downloader.clone(),
            opener.clone(),
            clock.clone(),
        );
        Fixture {
            source,
            downloader,
            opener,
            clock,
            store,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(FakeDownloader::new(Ok(true), Ok(true)))
    }

    #[test]
    fn test_list_within_ttl_uses_one_call() {
        let fx = fixture();
        let filter = ContractFilter {
            status: Some(ContractStatus::Signed),
            ..Default::default()
        };
        block_on(async {
            fx.store.list(&filter).await.unwrap();
            fx.clock.0.set(1_000.0 + DEFAULT_TTL_MS - 1.0);
            fx.store.list(&filter).await.unwrap();
        });
        assert_eq!(fx.source.list_calls.get(), 1);

        fx.clock.0.set(1_000.0 + DEFAULT_TTL_MS + 1.0);
        block_on(fx.store.list(&filter)).unwrap();
        assert_eq!(fx.source.list_calls.get(), 2);
    }

    #[test]
    fn test_list_filters_are_cached_separately() {
        let fx = fixture();
        let signed = ContractFilter {
            status: Some(ContractStatus::Signed),
            ..Default::default()
        };
        block_on(async {
            fx.store.list(&ContractFilter::default()).await.unwrap();
            fx.store.list(&signed).await.unwrap();
            fx.store.list(&signed.clone()).await.unwrap();
        });
        assert_eq!(fx.source.list_calls.get(), 2);
    }

    #[test]
    fn test_concurrent_list_shares_request() {
        let fx = fixture();
        let filter = ContractFilter::default();
        let (a, b) = block_on(async { futures::join!(fx.store.list(&filter), fx.store.list(&filter)) });
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(fx.source.list_calls.get(), 1);
        assert!(!fx.store.contracts_loading());
    }

    #[test]
    fn test_concurrent_get_files_shares_request() {
        let fx = fixture();
        fx.source.files.borrow_mut().push(file("f-1", "c-1", "e-1"));
        let (a, b) = block_on(async {
            futures::join!(
                fx.store.get_files("c-1", false),
                fx.store.get_files("c-1", false)
            )
        });
        let a = a.unwrap();
        assert_eq!(a, b.unwrap());
        assert_eq!(a.len(), 1);
        assert_eq!(fx.source.files_calls.get(), 1);
        assert!(fx.store.files_loading().is_empty());
    }

    #[test]
    fn test_files_loading_flag_while_in_flight() {
        let fx = fixture();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let store = fx.store.clone();
        let seen_in = seen.clone();
        fx.store.subscribe(Rc::new(move || {
            seen_in.borrow_mut().push(store.files_loading().contains("c-1"));
        }));
        block_on(fx.store.get_files("c-1", false)).unwrap();
        assert_eq!(seen.borrow().first(), Some(&true));
        assert_eq!(seen.borrow().last(), Some(&false));
    }

    #[test]
    fn test_duplicate_external_ids_keep_first() {
        let fx = fixture();
        {
            let mut files = fx.source.files.borrow_mut();
            files.push(file("f-1", "c-1", "ext-a"));
            files.push(file("f-2", "c-1", "ext-a"));
            files.push(file("f-3", "c-1", "ext-b"));
        }
        let files = block_on(fx.store.get_files("c-1", false)).unwrap();
        let ids: Vec<&str> = files.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["f-1", "f-3"]);
    }

    #[test]
    fn test_force_refresh_bypasses_ttl_and_clears_entries() {
        let fx = fixture();
        fx.source.files.borrow_mut().push(file("f-1", "c-1", "e-1"));
        block_on(fx.store.get_files("c-1", false)).unwrap();
        assert_eq!(fx.source.files_calls.get(), 1);

        *fx.source.files.borrow_mut() = vec![file("f-9", "c-1", "e-9")];
        let store = fx.store.clone();
        let cleared_before_fetch = Rc::new(Cell::new(false));
        let flag = cleared_before_fetch.clone();
        fx.store.subscribe(Rc::new(move || {
            if store.files_loading().contains("c-1") && store.cached_files("c-1").is_none() {
                flag.set(true);
            }
        }));

        let files = block_on(fx.store.get_files("c-1", true)).unwrap();
        assert_eq!(fx.source.files_calls.get(), 2);
        assert!(cleared_before_fetch.get());
        let ids: Vec<&str> = files.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["f-9"]);
        assert_eq!(fx.store.cached_files("c-1").unwrap().len(), 1);
    }

    #[test]
    fn test_force_refresh_during_fetch_issues_new_call() {
        let fx = fixture();
        fx.source.files.borrow_mut().push(file("f-1", "c-1", "e-1"));
        let (a, b) = block_on(async {
            futures::join!(
                fx.store.get_files("c-1", false),
                fx.store.get_files("c-1", true)
            )
        });
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(fx.source.files_calls.get(), 2);
    }

    #[test]
    fn test_download_direct_marks_completed() {
        let fx = fixture();
        fx.source.files.borrow_mut().push(file("f-1", "c-1", "e-1"));
        block_on(async {
            fx.store.get_files("c-1", false).await.unwrap();
            fx.store.download("c-1", "f-1").await.unwrap();
        });
        assert_eq!(
            fx.store.file_status("c-1", "f-1"),
            Some(DownloadStatus::Completed)
        );
        assert_eq!(fx.downloader.blob_calls.get(), 0);
        assert_eq!(fx.source.confirm_calls.get(), 1);
        assert!(fx.store.downloading().is_empty());
    }

    #[test]
    fn test_download_falls_back_to_blob() {
        for direct in [Ok(false), Err("blocked".to_string())] {
            let fx = fixture_with(FakeDownloader::new(direct, Ok(true)));
            fx.source.files.borrow_mut().push(file("f-1", "c-1", "e-1"));
            block_on(async {
                fx.store.get_files("c-1", false).await.unwrap();
                fx.store.download("c-1", "f-1").await.unwrap();
            });
            assert_eq!(fx.downloader.blob_calls.get(), 1);
            assert_eq!(
                fx.store.file_status("c-1", "f-1"),
                Some(DownloadStatus::Completed)
            );
        }
    }

    #[test]
    fn test_download_failure_marks_failed() {
        let fx = fixture_with(FakeDownloader::new(Ok(false), Err("network".into())));
        fx.source.files.borrow_mut().push(file("f-1", "c-1", "e-1"));
        let result = block_on(async {
            fx.store.get_files("c-1", false).await.unwrap();
            fx.store.download("c-1", "f-1").await
        });
        assert_eq!(result, Err("network".to_string()));
        assert_eq!(fx.store.file_status("c-1", "f-1"), Some(DownloadStatus::Failed));
        assert_eq!(fx.source.confirm_calls.get(), 0);
        assert!(fx.store.downloading().is_empty());
    }

    #[test]
    fn test_downloading_flag_set_while_running() {
        let fx = fixture();
        fx.source.files.borrow_mut().push(file("f-1", "c-1", "e-1"));
        block_on(fx.store.get_files("c-1", false)).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let store = fx.store.clone();
        let seen_in = seen.clone();
        fx.store.subscribe(Rc::new(move || {
            seen_in.borrow_mut().push((
                store.downloading().contains("f-1"),
                store.file_status("c-1", "f-1"),
            ));
        }));
        block_on(fx.store.download("c-1", "f-1")).unwrap();
        assert_eq!(
            seen.borrow().first(),
            Some(&(true, Some(DownloadStatus::Downloading)))
        );
    }

    #[test]
    fn test_view_opens_inline_link_without_status_change() {
        let fx = fixture();
        fx.source.files.borrow_mut().push(file("f-1", "c-1", "e-1"));
        block_on(async {
            fx.store.get_files("c-1", false).await.unwrap();
            fx.store.view("f-1").await.unwrap();
        });
        assert_eq!(
            fx.opener.opened.borrow().as_slice(),
            ["/files/f-1?d=inline".to_string()]
        );
        assert_eq!(fx.store.file_status("c-1", "f-1"), Some(DownloadStatus::Pending));
    }

    #[test]
    fn test_view_error_is_returned() {
        let fx = fixture();
        fx.source.fail_link.set(true);
        assert!(block_on(fx.store.view("f-1")).is_err());
        assert!(fx.opener.opened.borrow().is_empty());
    }

    #[test]
    fn test_apply_event_is_idempotent_and_requests_refetch() {
        let fx = fixture();
        fx.source.files.borrow_mut().push(file("f-1", "c-1", "e-1"));
        block_on(fx.store.get_files("c-1", false)).unwrap();

        let status = ContractFileEvent::StatusChanged {
            file_id: "f-1".into(),
            contract_id: "c-1".into(),
            status: DownloadStatus::Completed,
            downloaded_at: None,
            size: Some(2048),
        };
        fx.store.apply_event(&status);
        fx.store.apply_event(&status);
        let files = fx.store.cached_files("c-1").unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].download_status, DownloadStatus::Completed);
        assert_eq!(files[0].size, 2048);

        // событие о новом файле: известный договор перечитывается, неизвестный нет
        let added = |file_id: &str, contract_id: &str| ContractFileEvent::Added {
            file_id: file_id.into(),
            contract_id: contract_id.into(),
        };
        assert_eq!(fx.store.apply_event(&added("f-1", "c-1")), None);
        assert_eq!(fx.store.apply_event(&added("f-4", "c-404")), None);
        assert!(fx.store.cached_files("c-404").is_none());

        fx.source.files.borrow_mut().push(file("f-3", "c-1", "e-3"));
        let refetch = fx.store.apply_event(&added("f-3", "c-1"));
        assert_eq!(refetch.as_deref(), Some("c-1"));
        block_on(fx.store.get_files("c-1", true)).unwrap();
        let ids: Vec<String> = fx
            .store
            .cached_files("c-1")
            .unwrap()
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec!["f-1".to_string(), "f-3".to_string()]);
        assert_eq!(fx.store.apply_event(&added("f-3", "c-1")), None);

        fx.store.apply_event(&ContractFileEvent::Removed {
            file_id: "f-3".into(),
            contract_id: "c-1".into(),
        });
        assert_eq!(fx.store.cached_files("c-1").unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_keeps_first_external_id() {
        let mut state = StoreState::default();
        state.files.insert(
            "c-1".into(),
            CacheEntry {
                value: vec![file("f-1", "c-1", "e-1")],
                fetched_at: 0.0,
            },
        );
        assert!(!state.upsert_file(&file("f-2", "c-1", "e-1")));
        assert!(state.upsert_file(&file("f-3", "c-1", "e-3")));
        assert!(!state.upsert_file(&file("f-3", "c-1", "e-3")));
        assert!(!state.upsert_file(&file("f-4", "c-404", "e-4")));

        let mut completed = file("f-1", "c-1", "e-1");
        completed.download_status = DownloadStatus::Completed;
        assert!(state.upsert_file(&completed));

        let files = &state.files["c-1"].value;
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].download_status, DownloadStatus::Completed);
    }

    #[test]
    fn test_update_status_invalidates_lists() {
        let fx = fixture();
        let filter = ContractFilter::default();
        block_on(async {
            fx.store.list(&filter).await.unwrap();
            let updated = fx
                .store
                .update_status("c-1", ContractStatus::Pending)
                .await
                .unwrap();
            assert_eq!(updated.status, ContractStatus::Pending);
            fx.store.list(&filter).await.unwrap();
        });
        assert_eq!(fx.source.list_calls.get(), 2);
    }

    #[test]
    fn test_sync_files_refreshes_list() {
        let fx = fixture();
        block_on(fx.store.get_files("c-1", false)).unwrap();
        fx.source.files.borrow_mut().push(file("f-1", "c-1", "e-1"));
        block_on(fx.store.sync_files("c-1")).unwrap();
        assert_eq!(fx.source.files_calls.get(), 2);
        assert_eq!(fx.store.cached_files("c-1").unwrap().len(), 1);
    }

    #[test]
    fn test_invalidate_drops_everything() {
        let fx = fixture();
        block_on(async {
            fx.store.list(&ContractFilter::default()).await.unwrap();
            fx.store.get_files("c-1", false).await.unwrap();
        });
        fx.store.invalidate();
        assert!(fx.store.cached_files("c-1").is_none());
        block_on(fx.store.list(&ContractFilter::default())).unwrap();
        assert_eq!(fx.source.list_calls.get(), 2);
    }
}
