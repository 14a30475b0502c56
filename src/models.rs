use chrono::{NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

pub const SAMPLE_SIZE: usize = 5;

/// A single cell, either as read from the file or after cleaning.
///
/// `Empty` is the missing-value sentinel; it serializes as `""`.
#[derive(Debug, Clone)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric view of the cell: native numbers, or text that reads as a finite decimal.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => crate::services::sheet::utils::parse_decimal(s.trim()),
            _ => None,
        }
    }

    /// Label used when the value becomes a category or a CSV field.
    pub fn to_label(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number_plain(*n),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Date(d) => format_date_iso(d),
        }
    }

    fn normalized_bits(n: f64) -> u64 {
        if n == 0.0 {
            0.0f64.to_bits()
        } else {
            n.to_bits()
        }
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Empty, CellValue::Empty) => true,
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            (CellValue::Number(a), CellValue::Number(b)) => {
                Self::normalized_bits(*a) == Self::normalized_bits(*b)
            }
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Empty => {}
            CellValue::Text(s) => s.hash(state),
            CellValue::Number(n) => Self::normalized_bits(*n).hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Date(d) => d.hash(state),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_str(""),
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Date(d) => serializer.serialize_str(&format_date_iso(d)),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

fn format_number_plain(n: f64) -> String {
    // f64 Display already prints integral values without a fraction
    format!("{}", n)
}

fn format_date_iso(d: &NaiveDateTime) -> String {
    let time = d.time();
    if time.nanosecond() != 0 {
        d.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    } else if time.num_seconds_from_midnight() == 0 {
        d.format("%Y-%m-%d").to_string()
    } else {
        d.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

/// One row keyed by column name.
pub type Record = HashMap<String, CellValue>;

/// A record after cleaning. Never holds a key outside the table's columns.
pub type CleanedRow = Record;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl RawTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    Date,
    Boolean,
    String,
}

pub type ColumnTypeMap = BTreeMap<String, ColumnType>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub sum: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStats {
    pub total_values: usize,
    pub unique_values: usize,
    pub null_values: usize,
    pub sample_values: SmallVec<[CellValue; SAMPLE_SIZE]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericStats>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStats {
    pub total_rows: usize,
    pub total_columns: usize,
    pub column_stats: BTreeMap<String, ColumnStats>,
}

/// Typed, cleaned and summarized table ready for charting.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub columns: Vec<String>,
    pub data: Vec<CleanedRow>,
    pub column_types: ColumnTypeMap,
    pub stats: DatasetStats,
}

impl Dataset {
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.column_types.get(column).copied()
    }

    pub fn column_stats(&self, column: &str) -> Option<&ColumnStats> {
        self.stats.column_stats.get(column)
    }
}
