// Excel export (xlsx only)
//
// One worksheet, a bold header row, then one row per game. Blank cells are
// simply not written.

use loteria_core::ExportTable;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde_json::Value;
use tracing::debug;

use crate::ExportError;

pub const SHEET_NAME: &str = "Jogos";

/// Encode `table` as an Office Open XML workbook in memory.
pub fn encode(table: &ExportTable) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let header = Format::new().set_bold();
    for (i, column) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col(i), &column.header, &header)?;
        worksheet.set_column_width(col(i), column.width)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    for (r, export_row) in table.rows.iter().enumerate() {
        let row = row_index(r + 1);
        worksheet.write_number(row, 0, export_row.game_index as f64)?;
        for (c, cell) in export_row.numbers.iter().enumerate() {
            if let Some(value) = cell {
                write_value(worksheet, row, col(c + 1), value)?;
            }
        }
    }

    let bytes = workbook.save_to_buffer()?;
    debug!(rows = table.rows.len(), columns = table.columns.len(), bytes = bytes.len(), "encoded xlsx");
    Ok(bytes)
}

/// Write a reply value verbatim: numbers stay numeric, anything else keeps its text.
fn write_value(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Value,
) -> Result<(), ExportError> {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Value::Number(n) => match n.as_f64() {
            Some(f) => {
                worksheet.write_number(row, col, f)?;
            }
            None => {
                worksheet.write_string(row, col, n.to_string())?;
            }
        },
        Value::String(s) => {
            worksheet.write_string(row, col, s)?;
        }
        Value::Array(_) | Value::Object(_) => {
            worksheet.write_string(row, col, value.to_string())?;
        }
    }
    Ok(())
}

// Out-of-range indexes saturate so rust_xlsxwriter reports its own limit error.
fn col(i: usize) -> u16 {
    u16::try_from(i).unwrap_or(u16::MAX)
}

fn row_index(i: usize) -> u32 {
    u32::try_from(i).unwrap_or(u32::MAX)
}
