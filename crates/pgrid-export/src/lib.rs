//! Excel export for the data grid.
//!
//! Exports are triggered either directly or through a visible/all-columns
//! menu. Callers can shape the worksheet through [`WorksheetHooks`] that run
//! before and after the grid writes its rows.

mod error;
mod naming;
mod request;
mod workbook;

pub use error::{ExportError, Result};
pub use naming::{FILE_EXTENSION, PRODUCT_NAME, export_file_name};
pub use request::{ExcelOptions, ExportChoice, ExportControl, ExportMenu, ExportRequest};
pub use workbook::{
    ExportColumn, ExportOutcome, ExportSource, FnHooks, NoHooks, SheetLayout, WorksheetHooks,
    export_workbook,
};

/// Re-exported so hooks can be written without a direct dependency.
pub use rust_xlsxwriter::{Format, Worksheet, XlsxError};
