//! Периоды отчётов (месяцы в формате "YYYY-MM") и диапазоны дат

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Месяц отчётного периода
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Разбор строки "YYYY-MM" (допускается и полная дата "YYYY-MM-DD")
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split('-');
        let year = parts.next()?.parse::<i32>().ok()?;
        let month = parts.next()?.parse::<u32>().ok()?;
        Self::new(year, month)
    }

    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day() - Duration::days(1)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    /// Короткая подпись для UI, например "мар 2025"
    pub fn label(&self) -> String {
        const MONTHS: [&str; 12] = [
            "янв", "фев", "мар", "апр", "май", "июн", "июл", "авг", "сен", "окт", "ноя", "дек",
        ];
        format!("{} {}", MONTHS[(self.month - 1) as usize], self.year)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

/// Все месяцы диапазона включительно (пустой список, если from > to)
pub fn periods_between(from: Period, to: Period) -> Vec<Period> {
    let mut result = Vec::new();
    let mut cur = from;
    while cur <= to {
        result.push(cur);
        cur = cur.next();
    }
    result
}

/// Запрос дашборда за диапазон дат ("YYYY-MM-DD")
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodRangeRequest {
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
}

/// Наибольший диапазон дашборда в месяцах (10 лет)
pub const MAX_RANGE_MONTHS: i32 = 120;

impl PeriodRangeRequest {
    /// Диапазон по умолчанию: последние 12 месяцев, включая текущий.
    ///
    /// Ошибка, если начало позже конца или диапазон длиннее `MAX_RANGE_MONTHS`.
    pub fn resolve(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), String> {
        let parse = |s: &Option<String>| {
            s.as_deref()
                .and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
        };
        let to = parse(&self.date_to).unwrap_or_else(|| Period::of(today).last_day());
        let from = parse(&self.date_from).unwrap_or_else(|| {
            let mut p = Period::of(to);
            for _ in 0..11 {
                p = p.prev();
            }
            p.first_day()
        });
        if from > to {
            return Err(format!("Начало периода {} позже конца {}", from, to));
        }
        let months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32 + 1;
        if months > MAX_RANGE_MONTHS {
            return Err(format!(
                "Период {} месяцев длиннее допустимых {}",
                months, MAX_RANGE_MONTHS
            ));
        }
        Ok((from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_day_handles_leap_years() {
        assert_eq!(Period::new(2024, 2).unwrap().last_day().day(), 29);
        assert_eq!(Period::new(2025, 2).unwrap().last_day().day(), 28);
        assert_eq!(Period::new(2025, 12).unwrap().last_day().day(), 31);
    }

    #[test]
    fn test_parse_and_key() {
        let p = Period::parse("2025-03-17").unwrap();
        assert_eq!(p.key(), "2025-03");
        assert!(Period::parse("2025-13").is_none());
        assert!(Period::parse("garbage").is_none());
    }

    #[test]
    fn test_periods_between_crosses_year() {
        let list = periods_between(Period::new(2024, 11).unwrap(), Period::new(2025, 2).unwrap());
        let keys: Vec<String> = list.iter().map(|p| p.key()).collect();
        assert_eq!(keys, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
        assert!(periods_between(Period::new(2025, 2).unwrap(), Period::new(2025, 1).unwrap()).is_empty());
    }

    #[test]
    fn test_default_range_is_twelve_months() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let (from, to) = PeriodRangeRequest::default().resolve(today).unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
    }

    #[test]
    fn test_range_is_bounded() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let range = |from: &str, to: &str| PeriodRangeRequest {
            date_from: Some(from.into()),
            date_to: Some(to.into()),
        };
        assert!(range("0001-01-01", "9999-12-31").resolve(today).is_err());
        assert!(range("2025-03-01", "2025-02-28").resolve(today).is_err());
        assert!(range("2015-07-01", "2025-06-30").resolve(today).is_ok());
        assert!(range("2015-06-30", "2025-06-30").resolve(today).is_err());
        assert!(range("2025-06-10", "2025-06-10").resolve(today).is_ok());
    }
}
