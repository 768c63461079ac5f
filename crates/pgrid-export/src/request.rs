//! Export triggers: a direct button or a visible/all choice menu.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ExportError, Result};

/// Caller-supplied export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExcelOptions {
    /// Localized report name used in the generated file name.
    pub report_name: String,
    /// Explicit file name (without extension); overrides the naming convention.
    pub file_name: Option<String>,
    pub sheet_name: String,
    pub include_headers: bool,
    pub date_format: String,
    pub date_time_format: String,
    /// Keep the header row visible while scrolling.
    pub freeze_header: bool,
}

impl Default for ExcelOptions {
    fn default() -> Self {
        Self {
            report_name: "Report".to_string(),
            file_name: None,
            sheet_name: "Sheet1".to_string(),
            include_headers: true,
            date_format: "yyyy-mm-dd".to_string(),
            date_time_format: "yyyy-mm-dd hh:mm".to_string(),
            freeze_header: true,
        }
    }
}

impl ExcelOptions {
    pub fn named(report_name: impl Into<String>) -> Self {
        Self {
            report_name: report_name.into(),
            ..Self::default()
        }
    }
}

/// One export run: the caller's options merged with the column-scope choice.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub options: ExcelOptions,
    /// Export every column, hidden ones included, instead of only visible ones.
    pub all_columns: bool,
    pub generated_at: NaiveDateTime,
}

impl ExportRequest {
    pub fn new(options: ExcelOptions, all_columns: bool, generated_at: NaiveDateTime) -> Self {
        Self {
            options,
            all_columns,
            generated_at,
        }
    }

    /// Request stamped with the local wall-clock time.
    pub fn now(options: ExcelOptions, all_columns: bool) -> Self {
        Self::new(options, all_columns, Local::now().naive_local())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportChoice {
    VisibleColumns,
    AllColumns,
}

impl ExportChoice {
    pub const ALL: [ExportChoice; 2] = [ExportChoice::VisibleColumns, ExportChoice::AllColumns];

    pub fn label(self) -> &'static str {
        match self {
            Self::VisibleColumns => "Export visible columns",
            Self::AllColumns => "Export all columns",
        }
    }

    pub fn all_columns(self) -> bool {
        self == Self::AllColumns
    }
}

/// Menu offering visible-only or all-columns export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportMenu {
    options: ExcelOptions,
    open: bool,
}

impl ExportMenu {
    pub fn new(options: ExcelOptions) -> Self {
        Self {
            options,
            open: false,
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Entries shown while open.
    pub fn choices(&self) -> &'static [ExportChoice] {
        if self.open { &ExportChoice::ALL } else { &[] }
    }

    /// Dispatch a choice. The menu closes afterwards.
    pub fn choose(
        &mut self,
        choice: ExportChoice,
        generated_at: NaiveDateTime,
    ) -> Result<ExportRequest> {
        if !self.open {
            return Err(ExportError::MenuClosed);
        }
        self.open = false;
        debug!(?choice, "export menu choice");
        Ok(ExportRequest::new(
            self.options.clone(),
            choice.all_columns(),
            generated_at,
        ))
    }
}

/// The toolbar's export control.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportControl {
    Menu(ExportMenu),
    /// Single-click export with a fixed column scope.
    Direct {
        options: ExcelOptions,
        all_columns: bool,
    },
}

impl ExportControl {
    pub fn menu(options: ExcelOptions) -> Self {
        Self::Menu(ExportMenu::new(options))
    }

    pub fn direct(options: ExcelOptions, all_columns: bool) -> Self {
        Self::Direct {
            options,
            all_columns,
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, Self::Direct { .. })
    }

    /// Press the control: a direct control yields a request, a menu opens.
    pub fn press(&mut self, generated_at: NaiveDateTime) -> Option<ExportRequest> {
        match self {
            Self::Direct {
                options,
                all_columns,
            } => Some(ExportRequest::new(options.clone(), *all_columns, generated_at)),
            Self::Menu(menu) => {
                menu.open();
                None
            }
        }
    }

    pub fn as_menu_mut(&mut self) -> Option<&mut ExportMenu> {
        match self {
            Self::Menu(menu) => Some(menu),
            Self::Direct { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn menu_closes_after_choice() {
        let mut control = ExportControl::menu(ExcelOptions::named("Employees"));
        assert!(control.press(at()).is_none());
        let menu = control.as_menu_mut().unwrap();
        assert_eq!(menu.choices().len(), 2);
        let request = menu.choose(ExportChoice::AllColumns, at()).unwrap();
        assert!(request.all_columns);
        assert!(!menu.is_open());
        assert!(menu.choices().is_empty());
        assert!(matches!(
            menu.choose(ExportChoice::VisibleColumns, at()),
            Err(ExportError::MenuClosed)
        ));
    }

    #[test]
    fn direct_control_merges_scope_into_request() {
        let mut control = ExportControl::direct(ExcelOptions::named("Payroll"), false);
        let request = control.press(at()).unwrap();
        assert!(!request.all_columns);
        assert_eq!(request.options.report_name, "Payroll");
        assert_eq!(request.generated_at, at());
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: ExcelOptions =
            serde_json::from_str(r#"{"reportName":"Dependents","sheetName":"Data"}"#).unwrap();
        assert_eq!(options.report_name, "Dependents");
        assert_eq!(options.sheet_name, "Data");
        assert!(options.include_headers);
    }
}
