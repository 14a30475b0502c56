pub mod cleaner;
pub mod detector;
pub mod export;
pub mod parser;
pub mod stats;
pub mod utils;
pub mod validate;

pub use parser::FileKind;
pub use validate::SchemaMode;

use crate::error::IngestError;
use crate::models::Dataset;

/// Runs parse, clean, type detection and stats over one uploaded file.
pub fn ingest(bytes: &[u8], kind: FileKind, mode: SchemaMode) -> Result<Dataset, IngestError> {
    let start = std::time::Instant::now();
    tracing::info!("Ingesting {:?} file ({} bytes, {:?})", kind, bytes.len(), mode);

    let table = parser::parse(bytes, kind, mode)?;
    tracing::info!(
        "Parsed {} columns and {} rows in {:?}",
        table.columns.len(),
        table.row_count(),
        start.elapsed()
    );

    let data = cleaner::clean(&table.rows);
    let column_types = detector::detect_types(&data);
    let stats = stats::generate_stats(&data);
    tracing::debug!("Column types: {:?}", column_types);
    tracing::info!("Ingestion completed in {:?}", start.elapsed());

    Ok(Dataset {
        columns: table.columns,
        data,
        column_types,
        stats,
    })
}
