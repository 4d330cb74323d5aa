//! Exported workbooks read back with calamine

mod common;

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use clima::export::{DATA_SHEET_NAME, DESCRIPTION_SHEET_NAME};
use clima::models::build_catalog;
use clima::power::{PowerResponse, records_from_response};
use clima::{ClimateRecord, export_workbook};
use std::io::Cursor;

fn fixture_records() -> Vec<ClimateRecord> {
    let response: PowerResponse = serde_json::from_str(common::POWER_FIXTURE).unwrap();
    records_from_response(response).unwrap()
}

fn open(bytes: Vec<u8>) -> Xlsx<Cursor<Vec<u8>>> {
    open_workbook_from_rs(Cursor::new(bytes)).unwrap()
}

fn text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        other => panic!("expected a string cell, got {other:?}"),
    }
}

fn number(cell: &Data) -> f64 {
    match cell {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        other => panic!("expected a number cell, got {other:?}"),
    }
}

#[test]
fn test_sheets_and_names() {
    let exported = export_workbook(&fixture_records(), &build_catalog()).unwrap();
    assert_eq!(exported.file_name, "dados_climaticos_com_descricoes.xlsx");

    let workbook = open(exported.bytes);
    assert_eq!(
        workbook.sheet_names(),
        vec![DATA_SHEET_NAME.to_string(), DESCRIPTION_SHEET_NAME.to_string()]
    );
}

#[test]
fn test_data_sheet_matches_table() {
    let records = fixture_records();
    let exported = export_workbook(&records, &build_catalog()).unwrap();
    let mut workbook = open(exported.bytes);

    let range = workbook.worksheet_range(DATA_SHEET_NAME).unwrap();
    // header + 3 days, date + 11 variables
    assert_eq!(range.height(), 4);
    assert_eq!(range.width(), 12);

    let rows: Vec<&[Data]> = range.rows().collect();
    let header: Vec<String> = rows[0].iter().map(text).collect();
    assert_eq!(header, ClimateRecord::header());

    for (row, record) in rows[1..].iter().zip(&records) {
        assert_eq!(text(&row[0]), record.date_key());
        let values: Vec<f64> = row[1..].iter().map(number).collect();
        assert_eq!(values, record.values().collect::<Vec<_>>());
    }
}

#[test]
fn test_description_sheet_matches_catalog() {
    let catalog = build_catalog();
    let exported = export_workbook(&fixture_records(), &catalog).unwrap();
    let mut workbook = open(exported.bytes);

    let range = workbook.worksheet_range(DESCRIPTION_SHEET_NAME).unwrap();
    assert_eq!(range.height(), 12);
    assert_eq!(range.width(), 2);

    let rows: Vec<&[Data]> = range.rows().collect();
    assert_eq!(text(&rows[0][0]), "Variável");
    assert_eq!(text(&rows[0][1]), "Descrição");

    for (row, entry) in rows[1..].iter().zip(&catalog) {
        assert_eq!(text(&row[0]), entry.code);
        assert_eq!(text(&row[1]), entry.description);
    }
}

#[test]
fn test_empty_table_keeps_header() {
    let exported = export_workbook(&[], &build_catalog()).unwrap();
    let mut workbook = open(exported.bytes);

    let range = workbook.worksheet_range(DATA_SHEET_NAME).unwrap();
    assert_eq!(range.height(), 1);
    assert_eq!(range.width(), 12);
}
