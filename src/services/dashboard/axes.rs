use serde::Serialize;

use crate::models::{ColumnType, Dataset};

/// Default chart columns. `None` only when the dataset has too few columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartAxes {
    pub x: Option<String>,
    pub y: Option<String>,
}

/// Largest category count a column may have to be preferred as the X axis.
pub fn categorical_threshold(total_rows: usize) -> usize {
    (total_rows / 2).min(20).max(2)
}

/// String columns ordered by ascending distinct-value count.
/// Columns without stats sort last; ties keep declared order.
pub fn rank_categoricals(dataset: &Dataset) -> Vec<&str> {
    let mut candidates: Vec<&str> = unique_columns(dataset)
        .filter(|column| dataset.column_type(column) == Some(ColumnType::String))
        .collect();
    candidates.sort_by_key(|column| unique_values(dataset, column).unwrap_or(usize::MAX));
    candidates
}

pub fn select_axes(dataset: &Dataset) -> ChartAxes {
    let total_rows = if dataset.stats.total_rows > 0 {
        dataset.stats.total_rows
    } else {
        dataset.row_count()
    };
    let threshold = categorical_threshold(total_rows);
    let ranked = rank_categoricals(dataset);

    let x = ranked
        .iter()
        .find(|column| unique_values(dataset, column).map_or(true, |u| u <= threshold))
        .or_else(|| ranked.first())
        .copied()
        .or_else(|| dataset.columns.first().map(String::as_str));

    let y = unique_columns(dataset)
        .find(|column| dataset.column_type(column) == Some(ColumnType::Number))
        .or_else(|| dataset.columns.get(1).map(String::as_str));

    tracing::debug!("Selected axes x={:?} y={:?} (threshold {})", x, y, threshold);
    ChartAxes {
        x: x.map(str::to_string),
        y: y.map(str::to_string),
    }
}

fn unique_values(dataset: &Dataset, column: &str) -> Option<usize> {
    dataset.column_stats(column).map(|stats| stats.unique_values)
}

/// Declared columns with repeated names collapsed to their first position.
pub(crate) fn unique_columns(dataset: &Dataset) -> impl Iterator<Item = &str> {
    dataset
        .columns
        .iter()
        .enumerate()
        .filter(move |(idx, name)| !dataset.columns[..*idx].contains(name))
        .map(|(_, name)| name.as_str())
}
