//! Общие операции дашбордов: строки по месяцам, статистика и рейтинги

use chrono::NaiveDate;
use contracts::shared::period::{periods_between, Period};
use std::collections::BTreeMap;

/// Ключ периода "YYYY-MM" для даты
pub fn period_of(date: NaiveDate) -> String {
    Period::of(date).key()
}

/// Ключи всех месяцев диапазона (включительно)
pub fn period_keys(from: NaiveDate, to: NaiveDate) -> Vec<String> {
    periods_between(Period::of(from), Period::of(to))
        .iter()
        .map(Period::key)
        .collect()
}

/// Сумма значений по месяцам
pub fn group_sum_by_period<T, D, V>(items: &[T], date_fn: D, value_fn: V) -> BTreeMap<String, f64>
where
    D: Fn(&T) -> NaiveDate,
    V: Fn(&T) -> f64,
{
    let mut result = BTreeMap::new();
    for item in items {
        *result.entry(period_of(date_fn(item))).or_insert(0.0) += value_fn(item);
    }
    result
}

/// Накопитель строки дашборда
pub trait Accumulate<T> {
    fn accumulate(&mut self, item: &T);
}

/// Строки по месяцам: каждый месяц диапазона присутствует, даже пустой
#[derive(Debug, Clone)]
pub struct PeriodBuckets<R> {
    buckets: BTreeMap<String, R>,
}

impl<R: Default> PeriodBuckets<R> {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        let buckets = period_keys(from, to)
            .into_iter()
            .map(|key| (key, R::default()))
            .collect();
        Self { buckets }
    }

    /// Разложить элементы по месяцам. Элементы вне диапазона пропускаются.
    pub fn fold<T, D>(mut self, items: &[T], date_fn: D) -> Self
    where
        R: Accumulate<T>,
        D: Fn(&T) -> Option<NaiveDate>,
    {
        for item in items {
            let Some(date) = date_fn(item) else { continue };
            if let Some(bucket) = self.buckets.get_mut(&period_of(date)) {
                bucket.accumulate(item);
            }
        }
        self
    }

    /// Пары (период, строка) в хронологическом порядке
    pub fn into_rows(self) -> Vec<(String, R)> {
        self.buckets.into_iter().collect()
    }
}

/// Количество, сумма и среднее
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricStats {
    pub count: u32,
    pub sum: f64,
}

impl MetricStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }

    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Доля в процентах (0, если знаменатель нулевой)
pub fn percent(part: f64, whole: f64) -> f64 {
    if whole.abs() < f64::EPSILON {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// Округление денежных сумм до копеек
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Рейтинг по убыванию ключа.
///
/// Места начинаются с 1; равные значения делят место, следующее место
/// пропускается (1, 1, 3). При равенстве сохраняется исходный порядок.
pub fn rank_by<T, K>(items: Vec<T>, key_fn: K) -> Vec<(u32, T)>
where
    K: Fn(&T) -> f64,
{
    let mut keyed: Vec<(f64, T)> = items.into_iter().map(|item| (key_fn(&item), item)).collect();
    // sort_by стабильная
    keyed.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut result = Vec::with_capacity(keyed.len());
    let mut prev_key: Option<f64> = None;
    let mut rank = 0u32;
    for (position, (key, item)) in keyed.into_iter().enumerate() {
        if prev_key != Some(key) {
            rank = position as u32 + 1;
            prev_key = Some(key);
        }
        result.push((rank, item));
    }
    result
}

/// Первые n позиций рейтинга
pub fn top_n<T: Clone>(ranked: &[(u32, T)], n: usize) -> Vec<(u32, T)> {
    ranked.iter().take(n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[derive(Default, Debug, PartialEq)]
    struct Count(u32);

    impl Accumulate<NaiveDate> for Count {
        fn accumulate(&mut self, _item: &NaiveDate) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_group_sum_by_period() {
        let items = vec![(d(2025, 1, 3), 10.0), (d(2025, 1, 30), 5.0), (d(2025, 3, 1), 1.0)];
        let sums = group_sum_by_period(&items, |i| i.0, |i| i.1);
        assert_eq!(sums.get("2025-01"), Some(&15.0));
        assert_eq!(sums.get("2025-02"), None);
        assert_eq!(sums.get("2025-03"), Some(&1.0));
    }

    #[test]
    fn test_buckets_include_empty_months_and_skip_outside() {
        let dates = vec![d(2025, 1, 3), d(2025, 3, 9), d(2025, 3, 10), d(2026, 1, 1)];
        let rows = PeriodBuckets::<Count>::new(d(2025, 1, 1), d(2025, 3, 31))
            .fold(&dates, |x| Some(*x))
            .into_rows();
        let counts: Vec<(&str, u32)> = rows.iter().map(|(k, c)| (k.as_str(), c.0)).collect();
        assert_eq!(counts, vec![("2025-01", 1), ("2025-02", 0), ("2025-03", 2)]);
    }

    #[test]
    fn test_metric_stats() {
        let mut stats = MetricStats::default();
        for v in [100.0, 200.0, 300.0] {
            stats.push(v);
        }
        assert_eq!(stats.count, 3);
        assert_eq!(stats.sum, 600.0);
        assert_eq!(stats.average(), 200.0);
        assert_eq!(MetricStats::default().average(), 0.0);
    }

    #[test]
    fn test_rank_ties_share_place() {
        let ranked = rank_by(vec![("a", 50.0), ("b", 90.0), ("c", 90.0), ("d", 10.0)], |x| x.1);
        let view: Vec<(u32, &str)> = ranked.iter().map(|(r, x)| (*r, x.0)).collect();
        assert_eq!(view, vec![(1, "b"), (1, "c"), (3, "a"), (4, "d")]);
    }

    #[test]
    fn test_top_n() {
        let ranked = rank_by(vec![1.0, 5.0, 3.0, 4.0], |x| *x);
        let podium = top_n(&ranked, 3);
        assert_eq!(podium, vec![(1, 5.0), (2, 4.0), (3, 3.0)]);
        assert_eq!(top_n(&ranked[..1], 3).len(), 1);
    }

    #[test]
    fn test_percent_and_rounding() {
        assert_eq!(percent(1.0, 4.0), 25.0);
        assert_eq!(percent(1.0, 0.0), 0.0);
        assert_eq!(round2(10.005_1), 10.01);
    }
}
