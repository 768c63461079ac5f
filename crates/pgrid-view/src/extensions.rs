//! Named extension points a call site can plug into a grid.
//!
//! Every extension point is a typed field. Field-keyed extensions are
//! checked against the column set when the extensions are built, so a typo
//! in a field name fails at construction instead of being silently ignored.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use pgrid_export::{NoHooks, WorksheetHooks};
use pgrid_filter::CellPredicate;
use pgrid_model::{CellFormatter, CellValue, ColumnDescriptor};

use crate::error::{Result, ViewError};

pub const DEFAULT_NO_ROWS_TEXT: &str = "No rows";

type QuickFilterFactory = Rc<dyn Fn(&str, &ColumnDescriptor) -> Option<CellPredicate>>;

#[derive(Clone)]
pub struct GridExtensions {
    formatters: BTreeMap<String, CellFormatter>,
    no_rows_overlay_text: Option<String>,
    export_hooks: Rc<dyn WorksheetHooks>,
    quick_filter: Option<QuickFilterFactory>,
}

impl Default for GridExtensions {
    fn default() -> Self {
        Self {
            formatters: BTreeMap::new(),
            no_rows_overlay_text: None,
            export_hooks: Rc::new(NoHooks),
            quick_filter: None,
        }
    }
}

impl GridExtensions {
    pub fn builder() -> GridExtensionsBuilder {
        GridExtensionsBuilder::default()
    }

    pub fn formatter(&self, field: &str) -> Option<&CellFormatter> {
        self.formatters.get(field)
    }

    pub fn no_rows_overlay_text(&self) -> &str {
        self.no_rows_overlay_text
            .as_deref()
            .unwrap_or(DEFAULT_NO_ROWS_TEXT)
    }

    pub fn export_hooks(&self) -> &dyn WorksheetHooks {
        self.export_hooks.as_ref()
    }

    pub fn quick_filter(&self) -> Option<&QuickFilterFactory> {
        self.quick_filter.as_ref()
    }

    /// Install the per-field formatters on a copy of `columns`.
    pub(crate) fn apply_formatters(&self, columns: &mut [ColumnDescriptor]) {
        for column in columns {
            if let Some(formatter) = self.formatters.get(&column.field) {
                column.render_cell = Some(formatter.clone());
            }
        }
    }
}

impl fmt::Debug for GridExtensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridExtensions")
            .field("formatters", &self.formatters.keys().collect::<Vec<_>>())
            .field("no_rows_overlay_text", &self.no_rows_overlay_text)
            .field("quick_filter", &self.quick_filter.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct GridExtensionsBuilder {
    formatters: BTreeMap<String, CellFormatter>,
    no_rows_overlay_text: Option<String>,
    export_hooks: Option<Rc<dyn WorksheetHooks>>,
    quick_filter: Option<QuickFilterFactory>,
}

impl GridExtensionsBuilder {
    /// Display formatter for one field; used by cells and string exports.
    #[must_use]
    pub fn cell_formatter(
        mut self,
        field: impl Into<String>,
        formatter: impl Fn(&CellValue) -> String + Send + Sync + 'static,
    ) -> Self {
        self.formatters
            .insert(field.into(), CellFormatter::new(formatter));
        self
    }

    #[must_use]
    pub fn no_rows_overlay_text(mut self, text: impl Into<String>) -> Self {
        self.no_rows_overlay_text = Some(text.into());
        self
    }

    #[must_use]
    pub fn export_hooks(mut self, hooks: impl WorksheetHooks + 'static) -> Self {
        self.export_hooks = Some(Rc::new(hooks));
        self
    }

    /// Replace the per-type quick-filter predicates. Hidden columns are still
    /// excluded.
    #[must_use]
    pub fn quick_filter(
        mut self,
        factory: impl Fn(&str, &ColumnDescriptor) -> Option<CellPredicate> + 'static,
    ) -> Self {
        self.quick_filter = Some(Rc::new(factory));
        self
    }

    /// Validate field references against `columns`.
    pub fn build(self, columns: &[ColumnDescriptor]) -> Result<GridExtensions> {
        if let Some(field) = self
            .formatters
            .keys()
            .find(|field| !columns.iter().any(|column| &column.field == *field))
        {
            return Err(ViewError::UnknownExtensionField {
                extension: "cell_formatter",
                field: field.clone(),
            });
        }
        Ok(GridExtensions {
            formatters: self.formatters,
            no_rows_overlay_text: self.no_rows_overlay_text,
            export_hooks: self.export_hooks.unwrap_or_else(|| Rc::new(NoHooks)),
            quick_filter: self.quick_filter,
        })
    }
}
