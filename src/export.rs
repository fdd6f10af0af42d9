use std::path::Path;

use rust_xlsxwriter::Workbook;
use tracing::info;

use crate::error::ExportError;
use crate::models::{Cell, TabularRecord};

pub const DEFAULT_FILE_NAME: &str = "ancestry_tree.xlsx";
pub const SHEET_NAME: &str = "Ancestry Tree";

/// Union of record columns in first-seen order.
pub fn column_order(records: &[TabularRecord]) -> Vec<&'static str> {
    let mut columns: Vec<&'static str> = Vec::new();
    for record in records {
        for column in record.columns() {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
    }
    columns
}

/// Write records to a single-sheet workbook: header row, then one row per record.
pub fn write_workbook(records: &[TabularRecord], path: &Path) -> Result<(), ExportError> {
    let columns = column_order(records);
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, name) in columns.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = i as u32 + 1;
        for (column, cell) in record.cells() {
            let Some(col) = columns.iter().position(|c| c == column) else {
                continue;
            };
            match cell {
                Cell::Text(s) => sheet.write_string(row, col as u16, s)?,
                Cell::Number(n) => sheet.write_number(row, col as u16, *n)?,
            };
        }
    }

    workbook.save(path)?;
    info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}
