use rayon::prelude::*;
use smallvec::SmallVec;
use std::collections::HashSet;

use crate::models::{CellValue, CleanedRow, ColumnStats, DatasetStats, NumericStats, SAMPLE_SIZE};

/// Summarizes every column of the first row's key set.
pub fn generate_stats(rows: &[CleanedRow]) -> DatasetStats {
    let Some(first) = rows.first() else {
        return DatasetStats::default();
    };

    let columns: Vec<&String> = first.keys().collect();
    let column_stats = columns
        .par_iter()
        .map(|column| ((*column).clone(), analyze_column(rows, column)))
        .collect();

    DatasetStats {
        total_rows: rows.len(),
        total_columns: columns.len(),
        column_stats,
    }
}

fn analyze_column(rows: &[CleanedRow], column: &str) -> ColumnStats {
    let values: Vec<&CellValue> = rows
        .iter()
        .filter_map(|row| row.get(column))
        .filter(|value| !value.is_empty())
        .collect();

    let mut seen = HashSet::with_capacity(values.len());
    let mut sample_values = SmallVec::<[CellValue; SAMPLE_SIZE]>::new();
    for value in &values {
        if seen.insert(*value) && sample_values.len() < SAMPLE_SIZE {
            sample_values.push((*value).clone());
        }
    }

    ColumnStats {
        total_values: values.len(),
        unique_values: seen.len(),
        null_values: rows.len() - values.len(),
        sample_values,
        numeric: numeric_stats(values.iter().filter_map(|value| value.as_number())),
    }
}

/// `None` when the iterator yields nothing.
///
/// `avg` falls back to a running mean when `sum` overflows, so it always stays
/// within `[min, max]`.
pub fn numeric_stats<I>(numbers: I) -> Option<NumericStats>
where
    I: IntoIterator<Item = f64>,
{
    let (count, min, max, sum, mean) = numbers.into_iter().fold(
        (0usize, f64::INFINITY, f64::NEG_INFINITY, 0.0, 0.0),
        |(count, min, max, sum, mean), n| {
            let count = count + 1;
            let mean = mean + n / count as f64 - mean / count as f64;
            (count, min.min(n), max.max(n), sum + n, mean)
        },
    );

    (count > 0).then(|| {
        let avg = if sum.is_finite() { sum / count as f64 } else { mean };
        NumericStats {
            min,
            max,
            avg: avg.max(min).min(max),
            sum,
        }
    })
}
