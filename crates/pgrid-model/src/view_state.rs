//! Grid view-state snapshot.
//!
//! The JSON layout of [`GridViewState`] is the persisted format:
//!
//! ```text
//! {
//!   "columns":       { "columnVisibilityModel": {..}, "orderedFields": [..] },
//!   "filter":        { "filterModel": { "items": [..], "linkOperator": "and" } },
//!   "sorting":       { "sortModel": [{ "field": "hired", "sort": "desc" }] },
//!   "pinnedColumns": { "left": [..], "right": [..] },
//!   "pagination":    { "page": 0, "pageSize": 100 },
//!   "preferencePanel": { "open": false }
//! }
//! ```
//!
//! `pagination` and `preferencePanel` are transient and never persisted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::column::ColumnDescriptor;
use crate::filter::FilterModel;

/// Snapshot of everything the user can change about a grid's presentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridViewState {
    #[serde(default)]
    pub columns: ColumnsState,
    #[serde(default)]
    pub filter: FilterState,
    #[serde(default)]
    pub sorting: SortingState,
    #[serde(default)]
    pub pinned_columns: PinnedColumns,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preference_panel: Option<PreferencePanelState>,
}

impl GridViewState {
    /// Copy with the pagination and preference-panel sub-trees removed.
    #[must_use]
    pub fn without_transient(&self) -> Self {
        Self {
            pagination: None,
            preference_panel: None,
            ..self.clone()
        }
    }

    /// Copy with any quick-filter search term removed.
    #[must_use]
    pub fn without_quick_filter(mut self) -> Self {
        self.filter.filter_model.quick_filter_values = None;
        self
    }

    /// Columns absent from the visibility model are visible.
    pub fn is_column_visible(&self, field: &str) -> bool {
        self.columns
            .column_visibility_model
            .get(field)
            .copied()
            .unwrap_or(true)
    }

    /// Whether `column` is shown. Non-hideable columns always are.
    pub fn shows_column(&self, column: &ColumnDescriptor) -> bool {
        !column.hideable || self.is_column_visible(&column.field)
    }

    pub fn filter_model(&self) -> &FilterModel {
        &self.filter.filter_model
    }

    pub fn sort_model(&self) -> &[SortItem] {
        &self.sorting.sort_model
    }
}

/// Field name to visibility. Missing entries mean visible.
pub type ColumnVisibilityModel = BTreeMap<String, bool>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnsState {
    #[serde(default)]
    pub column_visibility_model: ColumnVisibilityModel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ordered_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dimensions: BTreeMap<String, ColumnDimensions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDimensions {
    pub width: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    #[serde(default)]
    pub filter_model: FilterModel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortItem {
    pub field: String,
    pub sort: SortDirection,
}

impl SortItem {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            sort: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            sort: SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortingState {
    #[serde(default)]
    pub sort_model: Vec<SortItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedColumns {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub left: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub right: Vec<String>,
}

impl PinnedColumns {
    pub fn is_pinned(&self, field: &str) -> bool {
        self.left.iter().chain(&self.right).any(|pinned| pinned == field)
    }
}

pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub page: usize,
    pub page_size: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferencePanel {
    Filters,
    Columns,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencePanelState {
    pub open: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opened_panel_value: Option<PreferencePanel>,
}
