use crate::dashboards::d400_economics::api;
use crate::shared::components::{
    default_range, CardTone, LoadState, PageHeader, PeriodSelector, StatCard,
};
use crate::shared::format::{format_money, format_percent, format_thousands};
use contracts::dashboards::d400_economics::{EconomicsResponse, EconomicsRow};
use contracts::shared::period::{Period, PeriodRangeRequest};
use leptos::prelude::*;
use leptos::task::spawn_local;

fn period_label(key: &str) -> String {
    Period::parse(key).map(|p| p.label()).unwrap_or_else(|| key.to_string())
}

/// Экономика: выручка, материалы, комиссии и маржа по месяцам
#[component]
pub fn EconomicsDashboard() -> impl IntoView {
    let (from, to) = default_range();
    let date_from = RwSignal::new(from);
    let date_to = RwSignal::new(to);

    let data = RwSignal::new(None::<EconomicsResponse>);
    let loading = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);

    Effect::new(move |_| {
        let request = PeriodRangeRequest {
            date_from: Some(date_from.get()),
            date_to: Some(date_to.get()),
        };
        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api::get_economics(&request).await {
                Ok(response) => data.set(Some(response)),
                Err(e) => {
                    log::error!("Failed to load D400 economics: {}", e);
                    error.set(Some(e));
                }
            }
            loading.set(false);
        });
    });

    let total = move |f: fn(&EconomicsRow) -> String| {
        Signal::derive(move || data.with(|d| d.as_ref().map(|d| f(&d.totals))))
    };
    let margin_tone = move || {
        data.with(|d| match d {
            Some(d) if d.totals.margin < 0.0 => CardTone::Bad,
            Some(_) => CardTone::Good,
            None => CardTone::Neutral,
        })
    };

    view! {
        <div class="page" id="d400_economics--dashboard">
            <PageHeader title="Экономика" subtitle="Выручка и маржа по выполненным выездам">
                <PeriodSelector date_from=date_from date_to=date_to />
            </PageHeader>

            <LoadState loading=loading error=error />

            <div class="stat-cards">
                <StatCard
                    label="Выручка"
                    icon_name="money"
                    value=total(|t| format_money(t.revenue))
                />
                <StatCard
                    label="Материалы"
                    icon_name="cases"
                    value=total(|t| format_money(t.material_cost))
                />
                <StatCard
                    label="Комиссии техников"
                    icon_name="portal"
                    value=total(|t| format_money(t.commissions))
                />
                {move || view! {
                    <StatCard
                        label="Маржа"
                        icon_name="economics"
                        tone=margin_tone()
                        value=total(|t| format_money(t.margin))
                        subtitle=total(|t| format!("Средний чек {}", format_money(t.avg_case_value)))
                    />
                }}
            </div>

            <h2 class="section-title">"По месяцам"</h2>
            <table class="table">
                <thead>
                    <tr>
                        <th>"Месяц"</th>
                        <th class="num">"Выезды"</th>
                        <th class="num">"Выручка"</th>
                        <th class="num">"Материалы"</th>
                        <th class="num">"Комиссии"</th>
                        <th class="num">"Маржа"</th>
                        <th class="num">"Средний чек"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || data.with(|d| d.as_ref().map(|d| d.rows.clone()).unwrap_or_default())
                        .into_iter()
                        .map(|row| view! {
                            <tr>
                                <td>{period_label(&row.period)}</td>
                                <td class="num">{format_thousands(row.case_count as i64)}</td>
                                <td class="num">{format_money(row.revenue)}</td>
                                <td class="num">{format_money(row.material_cost)}</td>
                                <td class="num">{format_money(row.commissions)}</td>
                                <td class="num" class:negative=row.margin < 0.0>{format_money(row.margin)}</td>
                                <td class="num">{format_money(row.avg_case_value)}</td>
                            </tr>
                        })
                        .collect_view()}
                </tbody>
            </table>

            <h2 class="section-title">"По видам вредителей"</h2>
            <table class="table">
                <thead>
                    <tr>
                        <th>"Вредитель"</th>
                        <th class="num">"Выезды"</th>
                        <th class="num">"Выручка"</th>
                        <th class="num">"Доля"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || data.with(|d| d.as_ref().map(|d| d.by_pest_type.clone()).unwrap_or_default())
                        .into_iter()
                        .map(|row| view! {
                            <tr>
                                <td>{row.pest_type}</td>
                                <td class="num">{format_thousands(row.case_count as i64)}</td>
                                <td class="num">{format_money(row.revenue)}</td>
                                <td class="num">{format_percent(row.share_percent)}</td>
                            </tr>
                        })
                        .collect_view()}
                </tbody>
            </table>
        </div>
    }
}
