use contracts::domain::a002_contract_file::aggregate::{ContractFile, DownloadStatus};
use leptos::prelude::*;

use crate::domain::a001_contract::hook::use_contracts;
use crate::shared::date_utils::format_datetime;
use crate::shared::format::format_size;
use crate::shared::icons::icon;

fn status_class(status: DownloadStatus) -> &'static str {
    match status {
        DownloadStatus::Pending => "badge",
        DownloadStatus::Downloading => "badge badge--info",
        DownloadStatus::Completed => "badge badge--success",
        DownloadStatus::Failed => "badge badge--error",
    }
}

/// Файлы договора: просмотр, скачивание, обновление списка
#[component]
pub fn FilesPanel(
    #[prop(into)] contract_id: Signal<String>,
    /// Показать кнопку синхронизации с сервисом подписи
    #[prop(optional)]
    can_sync: bool,
) -> impl IntoView {
    let hook = use_contracts();

    Effect::new(move |_| {
        let id = contract_id.get();
        if !id.is_empty() {
            hook.load_files(id, false);
        }
    });

    let files = move || hook.files_of(&contract_id.get());
    let loading = move || hook.is_files_loading(&contract_id.get());

    let row = move |file: ContractFile| {
        let file_id = file.id.clone();
        let view_id = file.id.clone();
        let busy_id = file.id.clone();
        let status = file.download_status;
        view! {
            <tr>
                <td>{file.name.clone()}</td>
                <td>{file.kind.label()}</td>
                <td class="num">{format_size(file.size)}</td>
                <td><span class=status_class(status)>{status.label()}</span></td>
                <td>
                    {file
                        .downloaded_at
                        .map(|d| format_datetime(&d))
                        .unwrap_or_default()}
                </td>
                <td class="actions">
                    <button
                        class="button button--ghost"
                        title="Просмотр"
                        on:click=move |_| hook.view(view_id.clone())
                    >
                        {icon("view")}
                    </button>
                    <button
                        class="button button--ghost"
                        title="Скачать"
                        disabled=move || hook.is_downloading(&busy_id)
                        on:click=move |_| hook.download(contract_id.get_untracked(), file_id.clone())
                    >
                        {icon("download")}
                    </button>
                </td>
            </tr>
        }
    };

    view! {
        <div class="files-panel">
            <div class="files-panel__toolbar">
                <h3>"Файлы договора"</h3>
                <button
                    class="button button--secondary"
                    disabled=loading
                    on:click=move |_| hook.load_files(contract_id.get_untracked(), true)
                >
                    {icon("refresh")}
                    " Обновить"
                </button>
                <Show when=move || can_sync>
                    <button
                        class="button button--secondary"
                        disabled=loading
                        on:click=move |_| hook.sync_files(contract_id.get_untracked())
                    >
                        "Получить из сервиса подписи"
                    </button>
                </Show>
            </div>

            <Show
                when=move || !files().is_empty()
                fallback=move || view! {
                    <div class="files-panel__empty">
                        {move || if loading() { "Загрузка файлов..." } else { "Файлов нет" }}
                    </div>
                }
            >
                <table class="table">
                    <thead>
                        <tr>
                            <th>"Файл"</th>
                            <th>"Тип"</th>
                            <th>"Размер"</th>
                            <th>"Статус"</th>
                            <th>"Скачан"</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=files
                            key=|f| (f.id.clone(), f.download_status.as_str())
                            children=row
                        />
                    </tbody>
                </table>
            </Show>
        </div>
    }
}
