use chrono::{Datelike, NaiveDate, Utc};
use contracts::shared::period::Period;
use leptos::prelude::*;

/// Быстрый выбор периода
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickRange {
    CurrentMonth,
    PreviousMonth,
    LastTwelveMonths,
    CurrentYear,
}

impl QuickRange {
    const ALL: [QuickRange; 4] = [
        QuickRange::CurrentMonth,
        QuickRange::PreviousMonth,
        QuickRange::LastTwelveMonths,
        QuickRange::CurrentYear,
    ];

    fn label(&self) -> &'static str {
        match self {
            QuickRange::CurrentMonth => "0M",
            QuickRange::PreviousMonth => "-1M",
            QuickRange::LastTwelveMonths => "12M",
            QuickRange::CurrentYear => "Год",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            QuickRange::CurrentMonth => "Текущий месяц",
            QuickRange::PreviousMonth => "Предыдущий месяц",
            QuickRange::LastTwelveMonths => "Последние 12 месяцев",
            QuickRange::CurrentYear => "С начала года",
        }
    }

    /// Диапазон дат относительно `today`
    pub fn range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let current = Period::of(today);
        match self {
            QuickRange::CurrentMonth => (current.first_day(), current.last_day()),
            QuickRange::PreviousMonth => {
                let prev = current.prev();
                (prev.first_day(), prev.last_day())
            }
            QuickRange::LastTwelveMonths => {
                let mut start = current;
                for _ in 0..11 {
                    start = start.prev();
                }
                (start.first_day(), current.last_day())
            }
            QuickRange::CurrentYear => {
                let start = Period::new(today.year(), 1).unwrap_or(current);
                (start.first_day(), current.last_day())
            }
        }
    }
}

fn fmt(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// Диапазон по умолчанию для дашбордов
pub fn default_range() -> (String, String) {
    let (from, to) = QuickRange::LastTwelveMonths.range(Utc::now().date_naive());
    (fmt(from), fmt(to))
}

/// Выбор периода: две даты и кнопки быстрого выбора
#[component]
pub fn PeriodSelector(
    /// Дата "от" в формате yyyy-mm-dd
    date_from: RwSignal<String>,
    /// Дата "до" в формате yyyy-mm-dd
    date_to: RwSignal<String>,
) -> impl IntoView {
    view! {
        <div class="period-selector">
            <input
                type="date"
                class="period-selector__date"
                prop:value=move || date_from.get()
                on:change=move |ev| date_from.set(event_target_value(&ev))
            />
            <span class="period-selector__sep">"—"</span>
            <input
                type="date"
                class="period-selector__date"
                prop:value=move || date_to.get()
                on:change=move |ev| date_to.set(event_target_value(&ev))
            />
            {QuickRange::ALL
                .into_iter()
                .map(|quick| {
                    view! {
                        <button
                            class="period-selector__quick"
                            title=quick.title()
                            on:click=move |_| {
                                let (from, to) = quick.range(Utc::now().date_naive());
                                date_from.set(fmt(from));
                                date_to.set(fmt(to));
                            }
                        >
                            {quick.label()}
                        </button>
                    }
                })
                .collect_view()}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_quick_ranges() {
        let today = d(2025, 3, 15);
        assert_eq!(
            QuickRange::CurrentMonth.range(today),
            (d(2025, 3, 1), d(2025, 3, 31))
        );
        assert_eq!(
            QuickRange::PreviousMonth.range(d(2025, 1, 10)),
            (d(2024, 12, 1), d(2024, 12, 31))
        );
        assert_eq!(
            QuickRange::LastTwelveMonths.range(today),
            (d(2024, 4, 1), d(2025, 3, 31))
        );
        assert_eq!(
            QuickRange::CurrentYear.range(today),
            (d(2025, 1, 1), d(2025, 3, 31))
        );
    }
}
