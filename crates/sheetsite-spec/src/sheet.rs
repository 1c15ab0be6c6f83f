//! Tabular sources: sheets of trimmed string cells.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};

/// One sheet of a workbook, as a grid of trimmed cell strings.
///
/// Rows and columns are absolute: `rows[0][0]` is cell A1 even when the
/// used range of the sheet starts further in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    /// Sheet name (used in diagnostics)
    pub name: String,

    /// Rows of cells; blank cells are empty strings
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Create a sheet from rows of cells, trimming every cell.
    pub fn new<R, C>(name: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| cell.as_ref().trim().to_string())
                    .collect()
            })
            .collect();

        Self {
            name: name.into(),
            rows,
        }
    }

    /// Cell at `(row, col)`, or `""` outside the stored grid.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Whether the sheet has no rows at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A source of sheets, one per page.
pub trait SheetSource {
    /// Read every sheet, in source order.
    fn sheets(&mut self) -> Result<Vec<Sheet>, SheetError>;
}

impl SheetSource for Vec<Sheet> {
    fn sheets(&mut self) -> Result<Vec<Sheet>, SheetError> {
        Ok(self.clone())
    }
}

/// Errors that can occur when reading a workbook.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("Failed to open workbook: {message}")]
    Open { path: PathBuf, message: String },

    #[error("Failed to read sheet {sheet:?}: {message}")]
    Read { sheet: String, message: String },
}

/// File extensions recognized as workbooks.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Whether `path` looks like a workbook by extension (case-insensitive).
pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// A spreadsheet file on disk.
pub struct Workbook {
    inner: Sheets<std::io::BufReader<std::fs::File>>,
}

impl Workbook {
    /// Open a workbook, detecting the format from the file extension.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SheetError> {
        let path = path.as_ref();
        let inner = open_workbook_auto(path).map_err(|e| SheetError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(Self { inner })
    }
}

impl SheetSource for Workbook {
    fn sheets(&mut self) -> Result<Vec<Sheet>, SheetError> {
        let names = self.inner.sheet_names();
        let mut sheets = Vec::with_capacity(names.len());

        for name in names {
            let range = self
                .inner
                .worksheet_range(&name)
                .map_err(|e| SheetError::Read {
                    sheet: name.clone(),
                    message: e.to_string(),
                })?;

            sheets.push(Sheet {
                rows: range_to_rows(&range),
                name,
            });
        }

        Ok(sheets)
    }
}

/// Lay out a used range on the absolute A1-based grid.
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<String>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };

    let mut rows: Vec<Vec<String>> = vec![Vec::new(); start_row as usize];

    for row in range.rows() {
        let mut cells = vec![String::new(); start_col as usize];
        cells.extend(row.iter().map(cell_text));
        rows.push(cells);
    }

    rows
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook as XlsxWorkbook;
    use tempfile::tempdir;

    #[test]
    fn trims_cells_and_pads_lookups() {
        let sheet = Sheet::new("index", [vec!["  attribute ", "en"], vec!["path"]]);

        assert_eq!(sheet.cell(0, 0), "attribute");
        assert_eq!(sheet.cell(0, 1), "en");
        assert_eq!(sheet.cell(1, 1), "");
        assert_eq!(sheet.cell(9, 9), "");
    }

    #[test]
    fn recognizes_workbook_extensions() {
        assert!(is_workbook(Path::new("spec/site.xlsx")));
        assert!(is_workbook(Path::new("spec/site.ODS")));
        assert!(!is_workbook(Path::new("spec/notes.txt")));
        assert!(!is_workbook(Path::new("spec/xlsx")));
    }

    #[test]
    fn reads_sheets_in_workbook_order() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("site.xlsx");

        let mut book = XlsxWorkbook::new();
        let index = book.add_worksheet();
        index.set_name("index").unwrap();
        index.write_string(0, 1, "attribute").unwrap();
        index.write_string(0, 2, "en").unwrap();
        index.write_number(2, 2, 42.0).unwrap();
        let imprint = book.add_worksheet();
        imprint.set_name("imprint").unwrap();
        imprint.write_string(0, 0, " path ").unwrap();
        book.save(&path).unwrap();

        let sheets = Workbook::open(&path).unwrap().sheets().unwrap();

        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].name, "index");
        assert_eq!(sheets[0].cell(0, 0), "");
        assert_eq!(sheets[0].cell(0, 1), "attribute");
        assert_eq!(sheets[0].cell(0, 2), "en");
        assert_eq!(sheets[0].cell(2, 2), "42");
        assert_eq!(sheets[1].name, "imprint");
        assert_eq!(sheets[1].cell(0, 0), "path");
    }

    #[test]
    fn reports_unreadable_workbooks() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("broken.xlsx");
        std::fs::write(&path, "not a zip archive").unwrap();

        let result = Workbook::open(&path);

        assert!(matches!(result, Err(SheetError::Open { .. })));
    }
}
