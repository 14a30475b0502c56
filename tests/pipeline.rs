use rust_xlsxwriter::Workbook;
use std::collections::HashSet;

use sheet_dashboard::error::IngestError;
use sheet_dashboard::models::{CellValue, ColumnType, Dataset};
use sheet_dashboard::services::dashboard::{build_view, kpi::ValueFormat};
use sheet_dashboard::services::sheet::{
    cleaner, detector, export, ingest, parser, validate, FileKind, SchemaMode,
};

const PEOPLE_CSV: &str = "nome,idade,cidade\n\
João,30,São Paulo\n\
Maria,25,Rio de Janeiro\n\
Pedro,35,Belo Horizonte\n";

fn csv_dataset(csv: &str) -> Dataset {
    ingest(csv.as_bytes(), FileKind::Csv, SchemaMode::Permissive).expect("ingest csv")
}

fn people_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "produto").expect("header");
    worksheet.write_string(0, 1, "quantidade").expect("header");
    worksheet.write_string(0, 2, "ativo").expect("header");
    for (idx, (name, qty, active)) in [("caneta", 3.0, true), ("lápis", 7.5, false)]
        .into_iter()
        .enumerate()
    {
        let row = (idx + 1) as u32;
        worksheet.write_string(row, 0, name).expect("name");
        worksheet.write_number(row, 1, qty).expect("qty");
        worksheet.write_boolean(row, 2, active).expect("active");
    }
    workbook.save_to_buffer().expect("save workbook")
}

#[test]
fn people_csv_end_to_end() {
    let dataset = csv_dataset(PEOPLE_CSV);

    assert_eq!(dataset.columns, vec!["nome", "idade", "cidade"]);
    assert_eq!(dataset.column_type("nome"), Some(ColumnType::String));
    assert_eq!(dataset.column_type("idade"), Some(ColumnType::Number));
    assert_eq!(dataset.column_type("cidade"), Some(ColumnType::String));
    assert_eq!(dataset.stats.total_rows, 3);

    let numeric = dataset.column_stats("idade").unwrap().numeric.unwrap();
    assert_eq!(numeric.min, 25.0);
    assert_eq!(numeric.max, 35.0);
    assert_eq!(numeric.avg, 30.0);
    assert_eq!(numeric.sum, 90.0);
}

#[test]
fn every_row_has_exactly_the_header_keys() {
    let dataset = csv_dataset("a,b,c\n1,2\n4,5,6,7\n,,\n");
    let expected: HashSet<&str> = dataset.columns.iter().map(String::as_str).collect();
    for row in &dataset.data {
        let keys: HashSet<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, expected);
    }
}

#[test]
fn stats_are_consistent() {
    let dataset = csv_dataset(
        "regiao,valor,obs\n\
         Sul,10,\n\
         Norte,-4.5,x\n\
         Sul,,y\n\
         Leste,100,\n",
    );
    let total_rows = dataset.stats.total_rows;
    for (column, stats) in &dataset.stats.column_stats {
        assert_eq!(stats.total_values + stats.null_values, total_rows, "{}", column);
        assert!(stats.unique_values <= stats.total_values, "{}", column);
        if let Some(numeric) = stats.numeric {
            assert!(numeric.min <= numeric.avg && numeric.avg <= numeric.max);
            let count = stats.total_values as f64;
            assert!((numeric.sum - numeric.avg * count).abs() < 1e-9);
        }
    }
}

#[test]
fn typed_columns_hold_only_their_kind() {
    let dataset = csv_dataset(
        "n,d,b,s\n\
         1,2024-01-01,true,x\n\
         2.5,2024-02-29,false,3\n\
         ,,,\n",
    );
    for row in &dataset.data {
        assert!(matches!(row["n"], CellValue::Number(_) | CellValue::Empty));
        assert!(matches!(row["d"], CellValue::Date(_) | CellValue::Empty));
    }
    assert_eq!(dataset.column_type("b"), Some(ColumnType::Boolean));
    assert_eq!(dataset.column_type("s"), Some(ColumnType::String));
}

#[test]
fn mixed_column_types_diverge_from_numeric_stats() {
    let dataset = csv_dataset("c\n10\nabc\n20\n");
    assert_eq!(dataset.column_type("c"), Some(ColumnType::String));
    let numeric = dataset.column_stats("c").unwrap().numeric.unwrap();
    assert_eq!(numeric.sum, 30.0);
}

#[test]
fn cleaner_is_idempotent_over_parsed_rows() {
    let table = parser::parse(PEOPLE_CSV.as_bytes(), FileKind::Csv, SchemaMode::Permissive).unwrap();
    let once = cleaner::clean(&table.rows);
    assert_eq!(cleaner::clean(&once), once);
    assert_eq!(detector::detect_types(&once).len(), 3);
}

#[test]
fn workbook_first_sheet_is_read() {
    let dataset = ingest(&people_workbook(), FileKind::Spreadsheet, SchemaMode::Permissive).unwrap();

    assert_eq!(dataset.columns, vec!["produto", "quantidade", "ativo"]);
    assert_eq!(dataset.row_count(), 2);
    assert_eq!(dataset.column_type("quantidade"), Some(ColumnType::Number));
    assert_eq!(dataset.column_type("ativo"), Some(ColumnType::Boolean));
    assert_eq!(dataset.column_stats("quantidade").unwrap().numeric.unwrap().sum, 10.5);
}

#[test]
fn empty_workbook_parses_to_nothing() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet();
    let bytes = workbook.save_to_buffer().unwrap();

    let table = parser::parse(&bytes, FileKind::Spreadsheet, SchemaMode::Permissive).unwrap();
    assert!(table.columns.is_empty());
    assert!(table.rows.is_empty());
    assert_eq!(table.row_count(), 0);
}

#[test]
fn unsupported_and_malformed_inputs() {
    assert!(matches!(
        FileKind::detect("photo.png", Some("image/png")),
        Err(IngestError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        ingest(b"PK\x03\x04 broken", FileKind::Spreadsheet, SchemaMode::Permissive),
        Err(IngestError::MalformedInput(_))
    ));
}

#[test]
fn strict_mode_rejects_ragged_rows() {
    let err = ingest(b"a,b\n1,2\n3,4,5\n", FileKind::Csv, SchemaMode::Strict).unwrap_err();
    assert!(matches!(err, IngestError::InconsistentSchema { row: 2, .. }));

    let table = parser::parse(b"a,b\n1,2\n3,4\n", FileKind::Csv, SchemaMode::Strict).unwrap();
    assert_eq!(validate::validate_schema(&table.rows).unwrap().row_count, 2);
}

#[test]
fn large_valor_column_renders_average_in_reais() {
    let dataset = csv_dataset("valor\n7000\n8000\n");
    let view = build_view(&dataset);

    assert_eq!(view.kpis.len(), 1);
    let card = &view.kpis[0];
    assert_eq!(card.title, "valor");
    assert_eq!(card.metric_label, "Média");
    assert_eq!(card.format, ValueFormat::Currency);
    assert_eq!(card.display, "R$ 7.500,00");
}

#[test]
fn dashboard_view_for_people() {
    let view = build_view(&csv_dataset(PEOPLE_CSV));
    // three distinct names in three rows: none within the threshold, lowest cardinality wins
    assert_eq!(view.chart_axes.x.as_deref(), Some("nome"));
    assert_eq!(view.chart_axes.y.as_deref(), Some("idade"));
}

#[test]
fn cleaned_csv_copy() {
    let dataset = csv_dataset("produto,preço\n\"Caneta, azul\", 2.50 \nLápis,1\n");
    let csv = export::to_csv(&dataset.columns, &dataset.data).unwrap();
    assert_eq!(csv, "produto,preço\n\"Caneta, azul\",2.5\nLápis,1");
}
