use crate::dashboards::d404_technician_portal::api;
use crate::shared::components::{
    default_range, CardTone, LoadState, PageHeader, PeriodSelector, StatCard,
};
use crate::shared::date_utils::format_day;
use crate::shared::format::{format_money, format_percent};
use crate::system::auth::context::use_auth;
use contracts::dashboards::d404_technician_portal::{PortalRequest, PortalResponse};
use contracts::shared::period::Period;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Пустая строка означает "свой портал"
fn technician_filter(input: &str) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Портал техника: комиссии по месяцам и свои выезды
#[component]
pub fn TechnicianPortal() -> impl IntoView {
    let (auth, _) = use_auth();
    let is_admin = move || auth.with(|a| a.is_admin());

    let (from, to) = default_range();
    let date_from = RwSignal::new(from);
    let date_to = RwSignal::new(to);
    let technician_ref = RwSignal::new(String::new());

    let data = RwSignal::new(None::<PortalResponse>);
    let loading = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);

    let request = Memo::new(move |_| PortalRequest {
        date_from: Some(date_from.get()),
        date_to: Some(date_to.get()),
        technician_ref: technician_ref.with(|t| technician_filter(t)),
    });

    Effect::new(move |_| {
        let request = request.get();
        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api::get_portal(&request).await {
                Ok(response) => data.set(Some(response)),
                Err(e) => {
                    log::error!("Failed to load D404 portal: {}", e);
                    data.set(None);
                    error.set(Some(e));
                }
            }
            loading.set(false);
        });
    });

    let commission = Signal::derive(move || {
        data.with(|d| d.as_ref().map(|d| format_money(d.total_commission)))
    });
    let rate = Signal::derive(move || {
        data.with(|d| {
            d.as_ref()
                .map(|d| format!("Ставка {}", format_percent(d.commission_rate * 100.0)))
        })
    });
    let case_count = Signal::derive(move || {
        data.with(|d| d.as_ref().map(|d| d.cases.len().to_string()))
    });
    let subtitle = Signal::derive(move || {
        data.with(|d| d.as_ref().map(|d| d.technician_name.clone()))
    });

    view! {
        <div class="page" id="d404_technician_portal--dashboard">
            <PageHeader title="Мои комиссии" subtitle=subtitle>
                {move || is_admin().then(|| view! {
                    <input
                        class="form__input"
                        type="text"
                        placeholder="ID техника"
                        prop:value=move || technician_ref.get()
                        on:change=move |ev| technician_ref.set(event_target_value(&ev))
                    />
                })}
                <PeriodSelector date_from=date_from date_to=date_to />
            </PageHeader>

            <LoadState loading=loading error=error />

            <div class="stat-cards">
                <StatCard
                    label="Комиссия за период"
                    icon_name="money"
                    tone=CardTone::Good
                    value=commission
                    subtitle=rate
                />
                <StatCard label="Выезды" icon_name="cases" value=case_count />
            </div>

            <h2 class="section-title">"По месяцам"</h2>
            <table class="table">
                <thead>
                    <tr>
                        <th>"Месяц"</th>
                        <th class="num">"Выезды"</th>
                        <th class="num">"Выручка"</th>
                        <th class="num">"Комиссия"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || data.with(|d| d.as_ref().map(|d| d.rows.clone()).unwrap_or_default())
                        .into_iter()
                        .map(|row| {
                            let label = Period::parse(&row.period)
                                .map(|p| p.label())
                                .unwrap_or_else(|| row.period.clone());
                            view! {
                                <tr>
                                    <td>{label}</td>
                                    <td class="num">{row.case_count}</td>
                                    <td class="num">{format_money(row.revenue)}</td>
                                    <td class="num">{format_money(row.commission)}</td>
                                </tr>
                            }
                        })
                        .collect_view()}
                </tbody>
            </table>

            <h2 class="section-title">"Выезды"</h2>
            <table class="table">
                <thead>
                    <tr>
                        <th>"Дата"</th>
                        <th>"Клиент"</th>
                        <th>"Вредитель"</th>
                        <th>"Статус"</th>
                        <th>"Счёт"</th>
                        <th class="num">"Стоимость"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || data.with(|d| d.as_ref().map(|d| d.cases.clone()).unwrap_or_default())
                        .into_iter()
                        .map(|case| view! {
                            <tr>
                                <td>{format_day(&case.case_date)}</td>
                                <td>{case.customer_name}</td>
                                <td>{case.pest_type}</td>
                                <td>{case.status.label()}</td>
                                <td>{case.invoice_status.label()}</td>
                                <td class="num">{format_money(case.price)}</td>
                            </tr>
                        })
                        .collect_view()}
                </tbody>
            </table>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_technician_filter() {
        assert_eq!(technician_filter("  "), None);
        assert_eq!(technician_filter(" t-7 "), Some("t-7".to_string()));
    }
}
