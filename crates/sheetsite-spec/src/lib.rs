//! Page specifications read from spreadsheets.
//!
//! Each sheet of a workbook describes one page: a header naming the locales,
//! a row of per-locale output paths, and an indentation-encoded element tree
//! with per-locale text and attribute values.

pub mod node;
pub mod page;
pub mod sheet;

pub use node::{is_macro_key, SpecNode, ROOT_KEY};
pub use page::{PageSpec, StructureError, ATTRIBUTE_MARKER, PATH_MARKER};
pub use sheet::{is_workbook, Sheet, SheetError, SheetSource, Workbook, WORKBOOK_EXTENSIONS};
