//! Date-range and custom select filters shown in the toolbar.
//!
//! These narrow rows in addition to the filter model and are not part of
//! the persisted view state.

use chrono::NaiveDate;
use pgrid_model::{ColumnDescriptor, Row};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewError};

/// Inclusive calendar-day range on one date field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeFilter {
    pub field: String,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl DateRangeFilter {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            from: None,
            to: None,
        }
    }

    pub fn set_range(&mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<()> {
        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            return Err(ViewError::InvertedDateRange);
        }
        self.from = from;
        self.to = to;
        Ok(())
    }

    pub fn is_set(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// Rows without a parseable date only pass while no bound is set.
    pub fn matches(&self, column: &ColumnDescriptor, row: &Row) -> bool {
        if !self.is_set() {
            return true;
        }
        let Some(day) = column.value(row).as_datetime().map(|moment| moment.date()) else {
            return false;
        };
        self.from.is_none_or(|from| day >= from) && self.to.is_none_or(|to| day <= to)
    }
}

/// Caller-declared select filter: rows whose field equals the chosen option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFilter {
    pub key: String,
    pub label: String,
    pub field: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub selected: Option<String>,
}

impl CustomFilter {
    pub fn new<I, S>(
        key: impl Into<String>,
        label: impl Into<String>,
        field: impl Into<String>,
        options: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            label: label.into(),
            field: field.into(),
            options: options.into_iter().map(Into::into).collect(),
            selected: None,
        }
    }

    /// Choose an option, or `None` to show every row.
    pub fn select(&mut self, value: Option<&str>) -> Result<()> {
        if let Some(value) = value
            && !self.options.iter().any(|option| option == value)
        {
            return Err(ViewError::InvalidCustomFilterValue(value.to_string()));
        }
        self.selected = value.map(str::to_string);
        Ok(())
    }

    pub fn matches(&self, column: &ColumnDescriptor, row: &Row) -> bool {
        match &self.selected {
            Some(selected) => column.value(row).to_string() == *selected,
            None => true,
        }
    }
}
