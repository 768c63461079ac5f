//! Worksheet population and caller hooks.
//!
//! Population order: pre-process hook, header row, data rows, post-process
//! hook. The pre hook may move the header down (to make room for titles or
//! merged banners) through [`SheetLayout::header_row`].

use std::fs;
use std::path::{Path, PathBuf};

use pgrid_model::{CellValue, ColumnDescriptor, ColumnType, Row};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::info;

use crate::error::{ExportError, Result};
use crate::naming::{FILE_EXTENSION, export_file_name};
use crate::request::{ExcelOptions, ExportRequest};

const MAX_COLUMNS: usize = 16_384;
const MAX_ROWS: usize = 1_048_576;
/// Grid widths are pixels; worksheet widths are character units.
const PIXELS_PER_CHARACTER: f64 = 7.0;
const MIN_COLUMN_CHARS: f64 = 10.0;

/// A column as written to the worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportColumn {
    pub field: String,
    pub header: String,
    pub column_type: ColumnType,
    pub show_time: bool,
    pub width: Option<f32>,
}

impl From<&ColumnDescriptor> for ExportColumn {
    fn from(column: &ColumnDescriptor) -> Self {
        Self {
            field: column.field.clone(),
            header: column.header().to_string(),
            column_type: column.column_type,
            show_time: column.show_time,
            width: column.width,
        }
    }
}

/// Where the table sits on the sheet. Hooks read and adjust it.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    /// Zero-based row of the header; data starts on the row below.
    pub header_row: u32,
    pub columns: Vec<ExportColumn>,
    /// Data rows written; zero while the pre hook runs.
    pub row_count: u32,
}

impl SheetLayout {
    pub fn first_data_row(&self, include_headers: bool) -> u32 {
        if include_headers {
            self.header_row + 1
        } else {
            self.header_row
        }
    }

    /// Zero-based index of the last table column.
    pub fn last_column(&self) -> u16 {
        u16::try_from(self.columns.len().saturating_sub(1)).unwrap_or(u16::MAX)
    }
}

/// Caller extension points around row population.
///
/// Hooks get the live worksheet and may write titles, merge cells, set
/// formats or add totals. Their business meaning is up to the caller.
pub trait WorksheetHooks {
    fn pre_process(
        &self,
        _worksheet: &mut Worksheet,
        _layout: &mut SheetLayout,
    ) -> std::result::Result<(), XlsxError> {
        Ok(())
    }

    fn post_process(
        &self,
        _worksheet: &mut Worksheet,
        _layout: &SheetLayout,
    ) -> std::result::Result<(), XlsxError> {
        Ok(())
    }
}

/// No hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl WorksheetHooks for NoHooks {}

type PreHook = Box<dyn Fn(&mut Worksheet, &mut SheetLayout) -> std::result::Result<(), XlsxError>>;
type PostHook = Box<dyn Fn(&mut Worksheet, &SheetLayout) -> std::result::Result<(), XlsxError>>;

/// Hooks built from closures.
#[derive(Default)]
pub struct FnHooks {
    pre: Option<PreHook>,
    post: Option<PostHook>,
}

impl FnHooks {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pre(
        mut self,
        hook: impl Fn(&mut Worksheet, &mut SheetLayout) -> std::result::Result<(), XlsxError>
        + 'static,
    ) -> Self {
        self.pre = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn post(
        mut self,
        hook: impl Fn(&mut Worksheet, &SheetLayout) -> std::result::Result<(), XlsxError> + 'static,
    ) -> Self {
        self.post = Some(Box::new(hook));
        self
    }
}

impl WorksheetHooks for FnHooks {
    fn pre_process(
        &self,
        worksheet: &mut Worksheet,
        layout: &mut SheetLayout,
    ) -> std::result::Result<(), XlsxError> {
        match &self.pre {
            Some(hook) => hook(worksheet, layout),
            None => Ok(()),
        }
    }

    fn post_process(
        &self,
        worksheet: &mut Worksheet,
        layout: &SheetLayout,
    ) -> std::result::Result<(), XlsxError> {
        match &self.post {
            Some(hook) => hook(worksheet, layout),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for FnHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHooks")
            .field("pre", &self.pre.is_some())
            .field("post", &self.post.is_some())
            .finish()
    }
}

/// Rows and the column scopes they can be exported with.
#[derive(Debug, Clone)]
pub struct ExportSource<'a> {
    pub all_columns: Vec<&'a ColumnDescriptor>,
    pub visible_columns: Vec<&'a ColumnDescriptor>,
    pub rows: Vec<&'a Row>,
}

impl<'a> ExportSource<'a> {
    /// Columns for the request's scope, without action columns.
    pub fn columns_for(&self, request: &ExportRequest) -> Vec<&'a ColumnDescriptor> {
        let scope = if request.all_columns {
            &self.all_columns
        } else {
            &self.visible_columns
        };
        scope
            .iter()
            .copied()
            .filter(|column| column.column_type != ColumnType::Actions)
            .collect()
    }
}

/// A finished workbook.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    /// File name including extension.
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub row_count: usize,
    pub column_count: usize,
}

impl ExportOutcome {
    /// Write the workbook into `dir`, returning the full path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "export written");
        Ok(path)
    }
}

/// Build the workbook for `request`.
pub fn export_workbook(
    source: &ExportSource<'_>,
    request: &ExportRequest,
    hooks: &dyn WorksheetHooks,
) -> Result<ExportOutcome> {
    let columns = source.columns_for(request);
    if columns.is_empty() {
        return Err(ExportError::NoColumns);
    }
    if columns.len() > MAX_COLUMNS {
        return Err(ExportError::TooManyColumns(columns.len()));
    }
    let options = &request.options;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&options.sheet_name)?;

    let mut layout = SheetLayout {
        header_row: 0,
        columns: columns.iter().map(|column| ExportColumn::from(*column)).collect(),
        row_count: 0,
    };
    hooks.pre_process(worksheet, &mut layout)?;

    let first_data_row = layout.first_data_row(options.include_headers) as usize;
    if first_data_row + source.rows.len() > MAX_ROWS {
        return Err(ExportError::TooManyRows(source.rows.len()));
    }

    if options.include_headers {
        write_header(worksheet, &layout, options)?;
    }
    let formats = CellFormats::new(options);
    for (offset, row) in source.rows.iter().enumerate() {
        let sheet_row = to_row(first_data_row + offset)?;
        for (index, column) in columns.iter().enumerate() {
            write_cell(worksheet, sheet_row, to_col(index)?, column, row, &formats)?;
        }
    }
    layout.row_count = to_row(source.rows.len())?;

    hooks.post_process(worksheet, &layout)?;

    let bytes = workbook.save_to_buffer()?;
    let stem = options
        .file_name
        .clone()
        .unwrap_or_else(|| export_file_name(request.generated_at, &options.report_name));
    info!(
        rows = source.rows.len(),
        columns = columns.len(),
        all_columns = request.all_columns,
        "workbook exported"
    );
    Ok(ExportOutcome {
        file_name: format!("{stem}.{FILE_EXTENSION}"),
        bytes,
        row_count: source.rows.len(),
        column_count: columns.len(),
    })
}

fn to_row(index: usize) -> Result<u32> {
    u32::try_from(index).map_err(|_| ExportError::TooManyRows(index))
}

fn to_col(index: usize) -> Result<u16> {
    u16::try_from(index).map_err(|_| ExportError::TooManyColumns(index))
}

fn write_header(
    worksheet: &mut Worksheet,
    layout: &SheetLayout,
    options: &ExcelOptions,
) -> Result<()> {
    let bold = Format::new().set_bold();
    for (index, column) in layout.columns.iter().enumerate() {
        let col = to_col(index)?;
        worksheet.write_string_with_format(layout.header_row, col, &column.header, &bold)?;
        let chars = column
            .width
            .map(|pixels| f64::from(pixels) / PIXELS_PER_CHARACTER)
            .unwrap_or_else(|| (column.header.chars().count() as f64 + 2.0).max(MIN_COLUMN_CHARS));
        worksheet.set_column_width(col, chars)?;
    }
    if options.freeze_header {
        worksheet.set_freeze_panes(layout.header_row + 1, 0)?;
    }
    Ok(())
}

struct CellFormats {
    date: Format,
    date_time: Format,
}

impl CellFormats {
    fn new(options: &ExcelOptions) -> Self {
        Self {
            date: Format::new().set_num_format(&options.date_format),
            date_time: Format::new().set_num_format(&options.date_time_format),
        }
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    column: &ColumnDescriptor,
    data: &Row,
    formats: &CellFormats,
) -> Result<()> {
    let value = column.value(data);
    if value.is_null() {
        return Ok(());
    }
    match (column.column_type, &value) {
        (_, CellValue::Bool(flag)) if column.render_cell.is_none() => {
            worksheet.write_boolean(row, col, *flag)?;
        }
        (ColumnType::Number, _) if column.render_cell.is_none() => match value.as_f64() {
            Some(number) => {
                worksheet.write_number(row, col, number)?;
            }
            None => {
                worksheet.write_string(row, col, value.to_string())?;
            }
        },
        (ColumnType::Date, _) if column.render_cell.is_none() => match value.as_datetime() {
            Some(moment) => {
                let format = if column.show_time {
                    &formats.date_time
                } else {
                    &formats.date
                };
                worksheet.write_datetime_with_format(row, col, &moment, format)?;
            }
            None => {
                worksheet.write_string(row, col, value.to_string())?;
            }
        },
        _ => {
            worksheet.write_string(row, col, column.formatted(data))?;
        }
    }
    Ok(())
}
