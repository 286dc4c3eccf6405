use crate::dashboards::d401_billing::api;
use crate::shared::components::{
    default_range, CardTone, LoadState, PageHeader, PeriodSelector, StatCard,
};
use crate::shared::format::{format_money, format_percent};
use crate::shared::toast::use_toasts;
use contracts::dashboards::d401_billing::{BillingResponse, BillingRow};
use contracts::shared::period::{Period, PeriodRangeRequest};
use leptos::prelude::*;
use leptos::task::spawn_local;

fn billing_row(row: BillingRow, is_total: bool) -> impl IntoView {
    let label = if is_total {
        "Итого".to_string()
    } else {
        Period::parse(&row.period)
            .map(|p| p.label())
            .unwrap_or_else(|| row.period.clone())
    };
    view! {
        <tr class:table__totals=is_total>
            <td>{label}</td>
            <td class="num">{format_money(row.invoiced)}</td>
            <td class="num">{format_money(row.paid)}</td>
            <td class="num">{format_money(row.outstanding)}</td>
            <td class="num" class:negative={row.overdue > 0.0}>{format_money(row.overdue)}</td>
            <td class="num">{format_money(row.unbilled)}</td>
            <td class="num">{row.invoice_count}</td>
            <td class="num">{row.overdue_count}</td>
        </tr>
    }
}

/// Счета и оплаты по месяцам с выгрузкой в CSV
#[component]
pub fn BillingDashboard() -> impl IntoView {
    let (from, to) = default_range();
    let date_from = RwSignal::new(from);
    let date_to = RwSignal::new(to);

    let toasts = use_toasts();
    let data = RwSignal::new(None::<BillingResponse>);
    let loading = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);

    let request = Memo::new(move |_| PeriodRangeRequest {
        date_from: Some(date_from.get()),
        date_to: Some(date_to.get()),
    });

    Effect::new(move |_| {
        let request = request.get();
        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api::get_billing(&request).await {
                Ok(response) => data.set(Some(response)),
                Err(e) => {
                    log::error!("Failed to load D401 billing: {}", e);
                    error.set(Some(e));
                }
            }
            loading.set(false);
        });
    });

    let totals = move |f: fn(&BillingResponse) -> String| {
        Signal::derive(move || data.with(|d| d.as_ref().map(f)))
    };

    view! {
        <div class="page" id="d401_billing--dashboard">
            <PageHeader title="Счета и оплаты" subtitle="Выставлено, оплачено и просрочено по месяцам">
                <PeriodSelector date_from=date_from date_to=date_to />
                <button
                    class="button button--secondary"
                    on:click=move |_| {
                        let request = request.get_untracked();
                        spawn_local(async move {
                            if let Err(e) = api::export_csv(&request).await {
                                log::error!("D401 export failed: {}", e);
                                toasts.error(format!("Выгрузка не выполнена: {}", e));
                            }
                        });
                    }
                >
                    "Выгрузить CSV"
                </button>
            </PageHeader>

            <LoadState loading=loading error=error />

            <div class="stat-cards">
                <StatCard label="Выставлено" icon_name="billing" value=totals(|d| format_money(d.totals.invoiced)) />
                <StatCard
                    label="Оплачено"
                    icon_name="money"
                    tone=CardTone::Good
                    value=totals(|d| format_money(d.totals.paid))
                    subtitle=totals(|d| format!("Собираемость {}", format_percent(d.collection_rate)))
                />
                <StatCard
                    label="Просрочено"
                    icon_name="billing"
                    tone=CardTone::Warning
                    value=totals(|d| format_money(d.totals.overdue))
                    subtitle=totals(|d| format!("Счетов: {}", d.totals.overdue_count))
                />
                <StatCard label="Не выставлено" icon_name="cases" value=totals(|d| format_money(d.totals.unbilled)) />
            </div>

            <table class="table">
                <thead>
                    <tr>
                        <th>"Месяц"</th>
                        <th class="num">"Выставлено"</th>
                        <th class="num">"Оплачено"</th>
                        <th class="num">"К оплате"</th>
                        <th class="num">"Просрочено"</th>
                        <th class="num">"Не выставлено"</th>
                        <th class="num">"Счетов"</th>
                        <th class="num">"Просроченных"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || data.get().map(|d| {
                        let mut rows: Vec<_> = d
                            .rows
                            .into_iter()
                            .map(|row| billing_row(row, false).into_any())
                            .collect();
                        rows.push(billing_row(d.totals, true).into_any());
                        rows
                    })}
                </tbody>
            </table>
        </div>
    }
}
