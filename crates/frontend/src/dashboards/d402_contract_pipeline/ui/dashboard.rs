use crate::dashboards::d402_contract_pipeline::api;
use crate::shared::components::{
    default_range, CardTone, LoadState, PageHeader, PeriodSelector, StatCard,
};
use crate::shared::format::{format_money, format_percent, format_thousands};
use contracts::dashboards::d402_contract_pipeline::{PipelineResponse, PipelineStage};
use contracts::domain::a001_contract::aggregate::ContractStatus;
use contracts::shared::period::{Period, PeriodRangeRequest};
use leptos::prelude::*;
use leptos::task::spawn_local;

fn stage_tone(status: ContractStatus) -> CardTone {
    match status {
        ContractStatus::Signed | ContractStatus::Active => CardTone::Good,
        ContractStatus::Pending => CardTone::Warning,
        ContractStatus::Declined | ContractStatus::Overdue => CardTone::Bad,
        _ => CardTone::Neutral,
    }
}

fn stage_card(stage: PipelineStage) -> impl IntoView {
    let value = Signal::derive({
        let count = stage.count;
        move || Some(format_thousands(count as i64))
    });
    let subtitle = Signal::derive({
        let total = stage.total_value;
        move || Some(format_money(total))
    });
    view! {
        <StatCard
            label=stage.label
            icon_name="pipeline"
            tone=stage_tone(stage.status)
            value=value
            subtitle=subtitle
        />
    }
}

/// Воронка договоров: этапы, конверсия и подписания по месяцам
#[component]
pub fn PipelineDashboard() -> impl IntoView {
    let (from, to) = default_range();
    let date_from = RwSignal::new(from);
    let date_to = RwSignal::new(to);

    let data = RwSignal::new(None::<PipelineResponse>);
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
            match api::get_pipeline(&request).await {
                Ok(response) => data.set(Some(response)),
                Err(e) => {
                    log::error!("Failed to load D402 pipeline: {}", e);
                    error.set(Some(e));
                }
            }
            loading.set(false);
        });
    });

    let conversion = Signal::derive(move || {
        data.with(|d| d.as_ref().map(|d| format_percent(d.conversion_rate)))
    });
    let open_value =
        Signal::derive(move || data.with(|d| d.as_ref().map(|d| format_money(d.open_value))));

    view! {
        <div class="page" id="d402_contract_pipeline--dashboard">
            <PageHeader title="Воронка договоров" subtitle="От черновика до завершения">
                <PeriodSelector date_from=date_from date_to=date_to />
            </PageHeader>

            <LoadState loading=loading error=error />

            <div class="stat-cards">
                <StatCard label="Конверсия" icon_name="economics" tone=CardTone::Good value=conversion />
                <StatCard label="Открытые договоры" icon_name="contracts" value=open_value />
            </div>

            <h2 class="section-title">"Этапы"</h2>
            <div class="stat-cards stat-cards--pipeline">
                {move || data.with(|d| d.as_ref().map(|d| d.stages.clone()).unwrap_or_default())
                    .into_iter()
                    .map(stage_card)
                    .collect_view()}
            </div>

            <h2 class="section-title">"По месяцам"</h2>
            <table class="table">
                <thead>
                    <tr>
                        <th>"Месяц"</th>
                        <th class="num">"Создано"</th>
                        <th class="num">"Подписано"</th>
                        <th class="num">"Сумма подписанных"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || data.with(|d| d.as_ref().map(|d| d.months.clone()).unwrap_or_default())
                        .into_iter()
                        .map(|row| {
                            let label = Period::parse(&row.period)
                                .map(|p| p.label())
                                .unwrap_or_else(|| row.period.clone());
                            view! {
                                <tr>
                                    <td>{label}</td>
                                    <td class="num">{row.created}</td>
                                    <td class="num">{row.signed}</td>
                                    <td class="num">{format_money(row.signed_value)}</td>
                                </tr>
                            }
                        })
                        .collect_view()}
                </tbody>
            </table>
        </div>
    }
}
