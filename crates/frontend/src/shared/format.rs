//! Форматирование чисел для таблиц и карточек

/// Целое с разделителем разрядов (неразрывный пробел)
pub fn format_thousands(n: i64) -> String {
    let s = n.unsigned_abs().to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('\u{00a0}');
        }
        result.push(ch);
    }
    if n < 0 {
        result.push('-');
    }
    result.chars().rev().collect()
}

/// Денежная сумма: "12 345,67 ₽"
pub fn format_money(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let int_part = cents / 100;
    let frac = (cents % 100).unsigned_abs();
    let sign = if cents < 0 && int_part == 0 { "-" } else { "" };
    format!("{}{},{:02} ₽", sign, format_thousands(int_part), frac)
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value).replace('.', ",")
}

/// Размер файла для списка файлов
pub fn format_size(bytes: i64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b >= KB * KB {
        format!("{:.1} МБ", b / KB / KB).replace('.', ",")
    } else if b >= KB {
        format!("{:.0} КБ", b / KB)
    } else {
        format!("{} Б", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(1234567), "1\u{00a0}234\u{00a0}567");
        assert_eq!(format_thousands(-1500), "-1\u{00a0}500");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(1234.5), "1\u{00a0}234,50 ₽");
        assert_eq!(format_money(0.0), "0,00 ₽");
        assert_eq!(format_money(-0.5), "-0,50 ₽");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 Б");
        assert_eq!(format_size(2048), "2 КБ");
        assert_eq!(format_size(3 * 1024 * 1024 / 2), "1,5 МБ");
    }
}
