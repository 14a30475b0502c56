use serde::Serialize;
use std::collections::HashSet;

use crate::error::IngestError;
use crate::models::Record;

/// How strictly rows must match the header.
///
/// `Permissive` pads short rows with empty cells and ignores extra fields.
/// `Strict` rejects any row whose shape differs from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaMode {
    #[default]
    Permissive,
    Strict,
}

impl SchemaMode {
    pub fn from_strict_flag(strict: bool) -> Self {
        if strict {
            SchemaMode::Strict
        } else {
            SchemaMode::Permissive
        }
    }

    pub fn is_strict(self) -> bool {
        matches!(self, SchemaMode::Strict)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<String>,
}

/// Opt-in check that every row carries exactly the first row's keys.
pub fn validate_schema(rows: &[Record]) -> Result<SchemaSummary, IngestError> {
    let Some(first) = rows.first() else {
        return Ok(SchemaSummary {
            row_count: 0,
            column_count: 0,
            columns: Vec::new(),
        });
    };

    let expected: HashSet<&str> = first.keys().map(String::as_str).collect();

    for (idx, row) in rows.iter().enumerate().skip(1) {
        let consistent = row.len() == expected.len()
            && row.keys().all(|key| expected.contains(key.as_str()));
        if !consistent {
            tracing::warn!("Row {} does not share the header key set", idx + 1);
            return Err(IngestError::InconsistentSchema {
                row: idx + 1,
                expected: expected.len(),
                found: row.len(),
            });
        }
    }

    let mut columns: Vec<String> = first.keys().cloned().collect();
    columns.sort();

    Ok(SchemaSummary {
        row_count: rows.len(),
        column_count: columns.len(),
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), CellValue::from(*v)))
            .collect()
    }

    #[test]
    fn empty_rows_are_valid() {
        let summary = validate_schema(&[]).unwrap();
        assert_eq!(summary.row_count, 0);
        assert!(summary.columns.is_empty());
    }

    #[test]
    fn consistent_rows_pass() {
        let rows = vec![
            record(&[("a", "1"), ("b", "2")]),
            record(&[("b", "3"), ("a", "4")]),
        ];
        let summary = validate_schema(&rows).unwrap();
        assert_eq!(summary.column_count, 2);
        assert_eq!(summary.columns, vec!["a", "b"]);
    }

    #[test]
    fn mismatched_keys_fail() {
        let rows = vec![
            record(&[("a", "1"), ("b", "2")]),
            record(&[("a", "1"), ("c", "2")]),
        ];
        let err = validate_schema(&rows).unwrap_err();
        assert!(matches!(err, IngestError::InconsistentSchema { row: 2, .. }));
    }
}
