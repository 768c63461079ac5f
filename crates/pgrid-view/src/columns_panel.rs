//! Column visibility panel.
//!
//! The panel lists every column with a checkbox. Non-hideable columns are
//! listed checked and disabled. The search box narrows the list only; it
//! never changes visibility. Bulk actions return a new visibility model for
//! the grid to apply.

use pgrid_model::{ColumnDescriptor, ColumnVisibilityModel};

use crate::error::{Result, ViewError};

/// One checkbox row of the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnEntry {
    pub field: String,
    pub header: String,
    pub checked: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnsPanel {
    search: String,
    search_focused: bool,
}

impl Default for ColumnsPanel {
    fn default() -> Self {
        Self::mount()
    }
}

impl ColumnsPanel {
    /// A freshly opened panel with the search box focused.
    pub fn mount() -> Self {
        Self {
            search: String::new(),
            search_focused: true,
        }
    }

    pub fn is_search_focused(&self) -> bool {
        self.search_focused
    }

    pub fn blur_search(&mut self) {
        self.search_focused = false;
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    /// Entries whose header contains the search text, ignoring case.
    pub fn entries(
        &self,
        columns: &[ColumnDescriptor],
        model: &ColumnVisibilityModel,
    ) -> Vec<ColumnEntry> {
        let needle = self.search.trim().to_lowercase();
        columns
            .iter()
            .filter(|column| needle.is_empty() || column.header().to_lowercase().contains(&needle))
            .map(|column| ColumnEntry {
                field: column.field.clone(),
                header: column.header().to_string(),
                checked: !column.hideable || model.get(&column.field).copied().unwrap_or(true),
                disabled: !column.hideable,
            })
            .collect()
    }

    /// Flip one column's visibility.
    pub fn toggle(
        &self,
        columns: &[ColumnDescriptor],
        model: &ColumnVisibilityModel,
        field: &str,
    ) -> Result<ColumnVisibilityModel> {
        let column = columns
            .iter()
            .find(|column| column.field == field)
            .ok_or_else(|| ViewError::UnknownColumn(field.to_string()))?;
        if !column.hideable {
            return Err(ViewError::NotHideable(field.to_string()));
        }
        let visible = model.get(field).copied().unwrap_or(true);
        let mut next = model.clone();
        next.insert(field.to_string(), !visible);
        Ok(next)
    }

    /// Everything visible: the empty model.
    pub fn select_all(&self) -> ColumnVisibilityModel {
        ColumnVisibilityModel::new()
    }

    /// Every hideable column hidden; non-hideable columns are left out of the
    /// model and so stay visible.
    pub fn clear_all(&self, columns: &[ColumnDescriptor]) -> ColumnVisibilityModel {
        columns
            .iter()
            .filter(|column| column.hideable)
            .map(|column| (column.field.clone(), false))
            .collect()
    }
}
