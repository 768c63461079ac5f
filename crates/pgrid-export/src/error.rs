use std::path::PathBuf;

use rust_xlsxwriter::XlsxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: no exportable columns")]
    NoColumns,

    #[error("{0} columns exceed the worksheet column limit")]
    TooManyColumns(usize),

    #[error("{0} rows exceed the worksheet row limit")]
    TooManyRows(usize),

    #[error("the export menu is closed")]
    MenuClosed,

    #[error("workbook error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("failed to write export file: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ExportError>;
