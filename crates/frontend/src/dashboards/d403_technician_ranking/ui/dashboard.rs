use crate::dashboards::d403_technician_ranking::api;
use crate::shared::components::{
    default_range, LoadState, PageHeader, PeriodSelector, Podium, PodiumPlace,
};
use crate::shared::format::{format_money, format_thousands};
use contracts::dashboards::d403_technician_ranking::{
    TechnicianRankingResponse, TechnicianRankingRow,
};
use contracts::shared::period::PeriodRangeRequest;
use leptos::prelude::*;
use leptos::task::spawn_local;

fn to_place(row: &TechnicianRankingRow) -> PodiumPlace {
    PodiumPlace {
        rank: row.rank,
        name: row.technician_name.clone(),
        value: format_money(row.revenue),
    }
}

/// Рейтинг техников по выручке за период
#[component]
pub fn TechnicianRankingDashboard() -> impl IntoView {
    let (from, to) = default_range();
    let date_from = RwSignal::new(from);
    let date_to = RwSignal::new(to);

    let data = RwSignal::new(None::<TechnicianRankingResponse>);
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
            match api::get_ranking(&request).await {
                Ok(response) => data.set(Some(response)),
                Err(e) => {
                    log::error!("Failed to load D403 ranking: {}", e);
                    error.set(Some(e));
                }
            }
            loading.set(false);
        });
    });

    let places = Signal::derive(move || {
        data.with(|d| {
            d.as_ref()
                .map(|d| d.podium.iter().map(to_place).collect())
                .unwrap_or_default()
        })
    });

    view! {
        <div class="page" id="d403_technician_ranking--dashboard">
            <PageHeader title="Рейтинг техников" subtitle="Выручка по выполненным выездам">
                <PeriodSelector date_from=date_from date_to=date_to />
            </PageHeader>

            <LoadState loading=loading error=error />

            <Podium places=places />

            <table class="table">
                <thead>
                    <tr>
                        <th class="num">"Место"</th>
                        <th>"Техник"</th>
                        <th class="num">"Выезды"</th>
                        <th class="num">"Выручка"</th>
                        <th class="num">"Средний чек"</th>
                        <th class="num">"Комиссия"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || data.with(|d| d.as_ref().map(|d| d.rows.clone()).unwrap_or_default())
                        .into_iter()
                        .map(|row| view! {
                            <tr class=if row.rank <= 3 { "table__row--top" } else { "" }>
                                <td class="num">{row.rank}</td>
                                <td>{row.technician_name}</td>
                                <td class="num">{format_thousands(row.case_count as i64)}</td>
                                <td class="num">{format_money(row.revenue)}</td>
                                <td class="num">{format_money(row.avg_case_value)}</td>
                                <td class="num">{format_money(row.commission)}</td>
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
    fn test_to_place_formats_revenue() {
        let row = TechnicianRankingRow {
            rank: 2,
            technician_ref: "t-1".into(),
            technician_name: "Иванов".into(),
            case_count: 4,
            revenue: 12000.0,
            avg_case_value: 3000.0,
            commission: 1200.0,
        };
        let place = to_place(&row);
        assert_eq!(place.rank, 2);
        assert_eq!(place.name, "Иванов");
        assert_eq!(place.value, format_money(12000.0));
    }
}
