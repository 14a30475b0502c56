use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use std::io::Cursor;

use super::validate::SchemaMode;
use crate::error::IngestError;
use crate::models::{CellValue, RawTable, Record};

const SPREADSHEET_EXTENSIONS: [&str; 2] = [".xlsx", ".xls"];

/// Input format, decided from the declared MIME type and file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Spreadsheet,
}

impl FileKind {
    pub fn detect(file_name: &str, content_type: Option<&str>) -> Result<Self, IngestError> {
        let name = file_name.to_lowercase();
        let mime = content_type.unwrap_or_default().to_lowercase();

        if mime == "text/csv" || name.ends_with(".csv") {
            Ok(FileKind::Csv)
        } else if mime.contains("spreadsheet")
            || mime.contains("excel")
            || SPREADSHEET_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
        {
            Ok(FileKind::Spreadsheet)
        } else {
            tracing::warn!("Rejecting {} ({})", file_name, mime);
            Err(IngestError::UnsupportedFormat(file_name.to_string()))
        }
    }
}

pub fn parse(bytes: &[u8], kind: FileKind, mode: SchemaMode) -> Result<RawTable, IngestError> {
    match kind {
        FileKind::Csv => parse_csv(bytes, mode),
        FileKind::Spreadsheet => parse_spreadsheet(bytes, mode),
    }
}

pub fn parse_csv(bytes: &[u8], mode: SchemaMode) -> Result<RawTable, IngestError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| IngestError::MalformedInput(format!("CSV is not valid UTF-8: {}", e)))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    if text.trim().is_empty() {
        tracing::warn!("CSV input is empty");
        return Ok(RawTable::default());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::MalformedInput(format!("Failed to read CSV header: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| IngestError::MalformedInput(format!("Failed to read CSV row {}: {}", idx + 1, e)))?;

        if mode.is_strict() && record.len() != columns.len() {
            return Err(IngestError::InconsistentSchema {
                row: idx + 1,
                expected: columns.len(),
                found: record.len(),
            });
        }

        let cells = record.iter().map(|field| CellValue::Text(field.to_string()));
        rows.push(build_record(&columns, cells));
    }

    tracing::debug!("Parsed CSV with {} columns and {} rows", columns.len(), rows.len());
    Ok(RawTable { columns, rows })
}

pub fn parse_spreadsheet(bytes: &[u8], mode: SchemaMode) -> Result<RawTable, IngestError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor).map_err(|e| {
        tracing::error!("Failed to open workbook: {}", e);
        IngestError::MalformedInput(format!("Failed to open spreadsheet: {}", e))
    })?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| {
            IngestError::MalformedInput(format!("Failed to read first worksheet: {}", e))
        })?,
        None => {
            tracing::warn!("Workbook has no sheets");
            return Ok(RawTable::default());
        }
    };

    let rows: Vec<Vec<Data>> = range.rows().map(|row| row.to_vec()).collect();
    table_from_rows(&rows, mode)
}

/// Turns sheet rows into a table: first non-blank row is the header.
pub fn table_from_rows(rows: &[Vec<Data>], mode: SchemaMode) -> Result<RawTable, IngestError> {
    let mut non_blank = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.iter().any(|cell| !matches!(cell, Data::Empty)));

    let Some((_, header_row)) = non_blank.next() else {
        tracing::warn!("First worksheet is empty");
        return Ok(RawTable::default());
    };

    let header_width = used_width(header_row);
    let columns: Vec<String> = header_row[..header_width]
        .iter()
        .map(|cell| cell_from_data(cell).to_label())
        .collect();

    let mut records = Vec::new();
    for (idx, row) in non_blank {
        if mode.is_strict() && used_width(row) > columns.len() {
            return Err(IngestError::InconsistentSchema {
                row: idx,
                expected: columns.len(),
                found: used_width(row),
            });
        }
        records.push(build_record(&columns, row.iter().map(cell_from_data)));
    }

    tracing::debug!(
        "Parsed worksheet with {} columns and {} rows",
        columns.len(),
        records.len()
    );
    Ok(RawTable {
        columns,
        rows: records,
    })
}

fn used_width(row: &[Data]) -> usize {
    row.iter()
        .rposition(|cell| !matches!(cell, Data::Empty))
        .map_or(0, |pos| pos + 1)
}

pub fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) if f.is_finite() => CellValue::Number(*f),
        Data::Float(_) => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => cell
            .as_datetime()
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Zips header names with cells. Missing cells become `Empty`, extra cells are
/// dropped, and a repeated header name keeps the rightmost value.
fn build_record<I>(columns: &[String], cells: I) -> Record
where
    I: IntoIterator<Item = CellValue>,
{
    let mut cells = cells.into_iter();
    let mut record = Record::with_capacity(columns.len());
    for column in columns {
        let value = cells.next().unwrap_or(CellValue::Empty);
        record.insert(column.clone(), value);
    }
    record
}
