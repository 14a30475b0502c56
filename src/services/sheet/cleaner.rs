use super::utils::{parse_decimal, parse_iso_date};
use crate::models::{CellValue, CleanedRow, Record};

pub fn clean(rows: &[Record]) -> Vec<CleanedRow> {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|(key, value)| (key.clone(), clean_value(value)))
                .collect()
        })
        .collect()
}

/// Normalizes one cell. Text is trimmed, then coerced to a number or an ISO
/// date when it reads as one. Non-text values pass through unchanged.
pub fn clean_value(value: &CellValue) -> CellValue {
    let CellValue::Text(raw) = value else {
        return value.clone();
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    if let Some(number) = parse_decimal(trimmed) {
        return CellValue::Number(number);
    }
    if let Some(date) = parse_iso_date(trimmed) {
        return CellValue::Date(date);
    }
    CellValue::Text(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn trims_and_coerces() {
        assert_eq!(clean_value(&"  São Paulo ".into()), CellValue::from("São Paulo"));
        assert_eq!(clean_value(&" 30 ".into()), CellValue::Number(30.0));
        assert_eq!(clean_value(&"   ".into()), CellValue::Empty);
        assert_eq!(clean_value(&"true".into()), CellValue::from("true"));
        assert_eq!(clean_value(&"1.234,56".into()), CellValue::from("1.234,56"));
    }

    #[test]
    fn coerces_iso_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(clean_value(&"2024-01-15".into()), CellValue::Date(expected));
        assert_eq!(clean_value(&"2024-13-45".into()), CellValue::from("2024-13-45"));
    }

    #[test]
    fn numbers_win_over_dates() {
        assert_eq!(clean_value(&"20240115".into()), CellValue::Number(20240115.0));
    }

    #[test]
    fn cleaning_is_idempotent() {
        let row: Record = [
            ("a", CellValue::from(" 12.5 ")),
            ("b", CellValue::from("2023-06-01T08:00:00")),
            ("c", CellValue::Empty),
            ("d", CellValue::Bool(false)),
            ("e", CellValue::from(" x ")),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let once = clean(&[row]);
        let twice = clean(&once);
        assert_eq!(once, twice);
    }
}
