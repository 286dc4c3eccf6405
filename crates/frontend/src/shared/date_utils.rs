//! Форматирование дат для таблиц

use chrono::{DateTime, NaiveDate, Utc};

/// "15.03.2024 14:02"
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.format("%d.%m.%Y %H:%M").to_string()
}

/// "15.03.2024"
pub fn format_date(value: &DateTime<Utc>) -> String {
    format_day(&value.date_naive())
}

pub fn format_day(value: &NaiveDate) -> String {
    value.format("%d.%m.%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_datetime() {
        let value = Utc.with_ymd_and_hms(2024, 3, 15, 14, 2, 26).unwrap();
        assert_eq!(format_datetime(&value), "15.03.2024 14:02");
        assert_eq!(format_date(&value), "15.03.2024");
    }

    #[test]
    fn test_format_day() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        assert_eq!(format_day(&day), "07.01.2025");
    }
}
