use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::IngestError;
use crate::models::{CellValue, CleanedRow};

/// Rebuilds delimited text from `columns` and `rows` for the CSV copy stored
/// next to the original upload.
pub fn to_csv(columns: &[String], rows: &[CleanedRow]) -> Result<String, IngestError> {
    if columns.is_empty() {
        return Ok(String::new());
    }

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(columns)
        .map_err(|e| IngestError::Export(e.to_string()))?;

    for row in rows {
        let fields = columns.iter().map(|column| {
            row.get(column)
                .map(CellValue::to_label)
                .unwrap_or_default()
        });
        writer
            .write_record(fields)
            .map_err(|e| IngestError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| IngestError::Export(e.to_string()))?;
    let mut text = String::from_utf8(bytes).map_err(|e| IngestError::Export(e.to_string()))?;

    // no trailing newline after the last record
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use crate::services::sheet::{ingest, FileKind, SchemaMode};

    #[test]
    fn quotes_only_when_needed() {
        let columns = vec!["nome".to_string(), "obs".to_string(), "valor".to_string()];
        let mut row = Record::new();
        row.insert("nome".into(), CellValue::from("Silva, Ana"));
        row.insert("obs".into(), CellValue::from("disse \"oi\""));
        row.insert("valor".into(), CellValue::Number(2.5));
        let mut sparse = Record::new();
        sparse.insert("nome".into(), CellValue::from("Bob"));

        let csv = to_csv(&columns, &[row, sparse]).unwrap();
        assert_eq!(
            csv,
            "nome,obs,valor\n\"Silva, Ana\",\"disse \"\"oi\"\"\",2.5\nBob,,"
        );
    }

    #[test]
    fn header_only_when_no_rows() {
        let columns = vec!["a".to_string(), "b".to_string()];
        assert_eq!(to_csv(&columns, &[]).unwrap(), "a,b");
    }

    #[test]
    fn copy_reingests_to_the_same_rows() {
        let source = "t,n\n2023-06-01T08:00:00.250,1.5\n2023-06-02,\n";
        let dataset = ingest(source.as_bytes(), FileKind::Csv, SchemaMode::Permissive).unwrap();
        let copy = to_csv(&dataset.columns, &dataset.data).unwrap();
        assert_eq!(copy, "t,n\n2023-06-01T08:00:00.250,1.5\n2023-06-02,");

        let again = ingest(copy.as_bytes(), FileKind::Csv, SchemaMode::Permissive).unwrap();
        assert_eq!(again.data, dataset.data);
    }
}
