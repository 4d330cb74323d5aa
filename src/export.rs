//! Excel export of the fetched table and its variable descriptions

use crate::models::{ClimateRecord, VariableDescription};
use crate::Result;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::debug;

/// File name offered to the browser
pub const WORKBOOK_FILE_NAME: &str = "dados_climaticos_com_descricoes.xlsx";
/// MIME type of an xlsx document
pub const WORKBOOK_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const DATA_SHEET_NAME: &str = "Dados_Climaticos";
pub const DESCRIPTION_SHEET_NAME: &str = "Descrições";

const DESCRIPTION_HEADER: [&str; 2] = ["Variável", "Descrição"];

/// An xlsx document held in memory for one download
#[derive(Debug, Clone)]
pub struct ExportedWorkbook {
    pub file_name: &'static str,
    pub bytes: Vec<u8>,
}

/// Serialize the records and the catalog into a two-sheet workbook
pub fn export_workbook(
    records: &[ClimateRecord],
    catalog: &[VariableDescription],
) -> Result<ExportedWorkbook> {
    let header_format = Format::new().set_bold();
    let mut workbook = Workbook::new();

    let data_sheet = workbook.add_worksheet();
    data_sheet.set_name(DATA_SHEET_NAME)?;
    write_header(data_sheet, &ClimateRecord::header(), &header_format)?;

    for (row, record) in (1u32..).zip(records) {
        data_sheet.write_string(row, 0, record.date_key())?;
        for (col, value) in (1u16..).zip(record.values()) {
            data_sheet.write_number(row, col, value)?;
        }
    }

    let description_sheet = workbook.add_worksheet();
    description_sheet.set_name(DESCRIPTION_SHEET_NAME)?;
    write_header(description_sheet, &DESCRIPTION_HEADER, &header_format)?;

    for (row, entry) in (1u32..).zip(catalog) {
        description_sheet.write_string(row, 0, entry.code)?;
        description_sheet.write_string(row, 1, entry.description)?;
    }
    description_sheet.set_column_width(1, 60.0)?;

    let bytes = workbook.save_to_buffer()?;
    debug!(
        "Exported {} records into a {} byte workbook",
        records.len(),
        bytes.len()
    );

    Ok(ExportedWorkbook {
        file_name: WORKBOOK_FILE_NAME,
        bytes,
    })
}

fn write_header(sheet: &mut Worksheet, columns: &[&str], format: &Format) -> Result<()> {
    for (col, name) in (0u16..).zip(columns) {
        sheet.write_string_with_format(0, col, *name, format)?;
    }
    Ok(())
}
