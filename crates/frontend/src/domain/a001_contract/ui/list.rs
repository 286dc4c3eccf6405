use contracts::domain::a001_contract::aggregate::{Contract, ContractFilter, ContractStatus};
use leptos::prelude::*;

use super::FilesPanel;
use crate::domain::a001_contract::hook::use_contracts;
use crate::shared::components::PageHeader;
use crate::shared::date_utils::format_date;
use crate::shared::format::format_money;
use crate::system::auth::context::use_auth;

fn next_statuses(current: ContractStatus) -> Vec<ContractStatus> {
    ContractStatus::ALL
        .into_iter()
        .filter(|s| current.can_transition_to(*s))
        .collect()
}

/// Список договоров с фильтрами и панелью файлов.
///
/// Администратор видит все договоры и меняет статусы, клиент видит только свои
/// (ограничение на стороне backend).
#[component]
pub fn ContractList() -> impl IntoView {
    let hook = use_contracts();
    let (auth, _) = use_auth();
    let is_admin = move || {
        auth.with(|s| s.user_info.as_ref().map(|u| u.is_admin()).unwrap_or(false))
    };

    let status_filter = RwSignal::new(None::<ContractStatus>);
    let search = RwSignal::new(String::new());
    let contracts = RwSignal::new(Vec::<Contract>::new());
    let selected = RwSignal::new(None::<String>);

    let filter = Memo::new(move |_| {
        ContractFilter {
            status: status_filter.get(),
            search: Some(search.get()),
            ..Default::default()
        }
        .normalized()
    });

    Effect::new(move |_| {
        hook.load(filter.get(), contracts);
    });

    let reload = move || hook.load(filter.get_untracked(), contracts);

    view! {
        <div class="page" id="a001_contract--list">
            <PageHeader
                title=if is_admin() { "Договоры" } else { "Мои договоры" }
                subtitle="Статусы, суммы и подписанные документы"
            >
                <input
                    class="input"
                    type="search"
                    placeholder="Поиск по номеру, описанию, клиенту"
                    prop:value=move || search.get()
                    on:change=move |ev| search.set(event_target_value(&ev))
                />
                <select
                    class="select"
                    on:change=move |ev| {
                        status_filter.set(ContractStatus::from_str_opt(&event_target_value(&ev)))
                    }
                >
                    <option value="">"Все статусы"</option>
                    {ContractStatus::ALL
                        .into_iter()
                        .map(|s| view! { <option value=s.as_str()>{s.label()}</option> })
                        .collect_view()}
                </select>
                <button class="button button--secondary" on:click=move |_| {
                    hook.invalidate();
                    reload();
                }>
                    "Обновить"
                </button>
            </PageHeader>

            <Show when=move || hook.contracts_loading.get()>
                <div class="page-loading">"Загрузка договоров..."</div>
            </Show>

            <table class="table table--selectable">
                <thead>
                    <tr>
                        <th>"Номер"</th>
                        <th>"Описание"</th>
                        <th>"Клиент"</th>
                        <th>"Статус"</th>
                        <th class="num">"Сумма"</th>
                        <th>"Подписан"</th>
                        {move || is_admin().then(|| view! { <th>"Действия"</th> })}
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=move || contracts.get()
                        key=|c| (c.to_string_id(), c.status)
                        children=move |c: Contract| {
                            let id = c.to_string_id();
                            let row_id = id.clone();
                            let is_selected = {
                                let id = id.clone();
                                move || selected.get().as_deref() == Some(id.as_str())
                            };
                            let actions = next_statuses(c.status)
                                .into_iter()
                                .map(|next| {
                                    let id = id.clone();
                                    view! {
                                        <button
                                            class="button button--small"
                                            on:click=move |ev| {
                                                ev.stop_propagation();
                                                hook.set_status(id.clone(), next, reload);
                                            }
                                        >
                                            {next.label()}
                                        </button>
                                    }
                                })
                                .collect_view();
                            view! {
                                <tr
                                    class:selected=is_selected
                                    on:click=move |_| selected.set(Some(row_id.clone()))
                                >
                                    <td>{c.base.code.clone()}</td>
                                    <td>{c.base.description.clone()}</td>
                                    <td>{c.customer_name.clone()}</td>
                                    <td>{c.status.label()}</td>
                                    <td class="num">{format_money(c.total_value)}</td>
                                    <td>
                                        {c.signed_at.map(|d| format_date(&d)).unwrap_or_default()}
                                    </td>
                                    {is_admin().then(|| view! { <td class="actions">{actions}</td> })}
                                </tr>
                            }
                        }
                    />
                </tbody>
            </table>

            {move || selected.get().map(|id| view! {
                <FilesPanel contract_id=id can_sync=is_admin() />
            })}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_statuses() {
        assert_eq!(
            next_statuses(ContractStatus::Draft),
            vec![ContractStatus::Pending, ContractStatus::Declined]
        );
        assert!(next_statuses(ContractStatus::Ended).is_empty());
    }
}
