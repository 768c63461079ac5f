//! Grid configuration.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::column::ColumnDescriptor;
use crate::error::{ModelError, Result};
use crate::view_state::GridViewState;

/// Named descriptor of one grid.
///
/// `name` doubles as the storage key for persisted view state, so two grids
/// mounted at the same time against the same store must not share a name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<GridViewState>,
    #[serde(default)]
    pub save_grid_state: bool,
    /// Persist even when the page was opened with query parameters.
    #[serde(default)]
    pub discard_query_string_save_restrict: bool,
}

impl GridConfig {
    /// Build a validated configuration.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Result<Self> {
        let config = Self {
            name: Some(name.into()),
            columns,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Column fields must be non-empty and unique.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for column in &self.columns {
            if column.field.trim().is_empty() {
                return Err(ModelError::EmptyField);
            }
            if !seen.insert(column.field.as_str()) {
                return Err(ModelError::DuplicateField(column.field.clone()));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn with_save_grid_state(mut self, save: bool) -> Self {
        self.save_grid_state = save;
        self
    }

    #[must_use]
    pub fn with_initial_state(mut self, state: GridViewState) -> Self {
        self.initial_state = Some(state);
        self
    }

    #[must_use]
    pub fn discarding_query_string_restrict(mut self) -> Self {
        self.discard_query_string_save_restrict = true;
        self
    }

    /// The grid name, if set and non-blank.
    pub fn storage_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn column(&self, field: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.field == field)
    }

    /// Look up a column, failing on unknown fields.
    pub fn require_column(&self, field: &str) -> Result<&ColumnDescriptor> {
        self.column(field)
            .ok_or_else(|| ModelError::UnknownField(field.to_string()))
    }
}
