//! Helpers for authoring workbooks in tests.

use std::path::Path;

use rust_xlsxwriter::Workbook;

/// Write a workbook with one sheet per `(name, rows)`; blank cells are left empty.
pub fn write_workbook(path: &Path, sheets: &[(&str, Vec<Vec<&str>>)]) {
    let mut book = Workbook::new();

    for (name, rows) in sheets {
        let sheet = book.add_worksheet();
        sheet.set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if !cell.is_empty() {
                    sheet.write_string(r as u32, c as u16, *cell).unwrap();
                }
            }
        }
    }

    book.save(path).unwrap();
}
