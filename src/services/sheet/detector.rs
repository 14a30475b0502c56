use super::utils::parse_iso_date;
use crate::models::{CellValue, CleanedRow, ColumnType, ColumnTypeMap};

type Predicate = fn(&CellValue) -> bool;

/// Checked in order; the first one every non-empty value satisfies decides the type.
const TYPE_RULES: [(ColumnType, Predicate); 3] = [
    (ColumnType::Number, is_number),
    (ColumnType::Date, is_date),
    (ColumnType::Boolean, is_boolean),
];

fn is_number(value: &CellValue) -> bool {
    value.as_number().is_some()
}

fn is_date(value: &CellValue) -> bool {
    match value {
        CellValue::Date(_) => true,
        CellValue::Text(s) => parse_iso_date(s.trim()).is_some(),
        _ => false,
    }
}

fn is_boolean(value: &CellValue) -> bool {
    match value {
        CellValue::Bool(_) => true,
        CellValue::Text(s) => s == "true" || s == "false",
        _ => false,
    }
}

/// Infers one type per column of the first row's key set.
pub fn detect_types(rows: &[CleanedRow]) -> ColumnTypeMap {
    let Some(first) = rows.first() else {
        return ColumnTypeMap::new();
    };

    first
        .keys()
        .map(|column| {
            let values: Vec<&CellValue> = rows
                .iter()
                .filter_map(|row| row.get(column))
                .filter(|value| !value.is_empty())
                .collect();
            (column.clone(), column_type(&values))
        })
        .collect()
}

fn column_type(values: &[&CellValue]) -> ColumnType {
    if values.is_empty() {
        return ColumnType::String;
    }

    TYPE_RULES
        .iter()
        .find(|(_, predicate)| values.iter().all(|value| predicate(*value)))
        .map_or(ColumnType::String, |(column_type, _)| *column_type)
}
