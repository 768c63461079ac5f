//! Column descriptors.
//!
//! A column is keyed by its `field`; every grid-wide model (visibility,
//! filtering, sorting, pinning) indexes columns by that key.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::filter::FilterOperator;
use crate::value::{CellValue, Row};

/// Data type of a column. Drives operators, comparators and quick filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnType {
    #[default]
    String,
    Number,
    Date,
    SingleSelect,
    Actions,
}

/// Horizontal alignment of cell content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Derives a cell value from the whole row.
#[derive(Clone)]
pub struct ValueGetter(Arc<dyn Fn(&Row) -> CellValue + Send + Sync>);

impl ValueGetter {
    pub fn new(getter: impl Fn(&Row) -> CellValue + Send + Sync + 'static) -> Self {
        Self(Arc::new(getter))
    }

    pub fn get(&self, row: &Row) -> CellValue {
        (self.0)(row)
    }
}

impl fmt::Debug for ValueGetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueGetter(..)")
    }
}

/// Formats a cell value for display and export.
#[derive(Clone)]
pub struct CellFormatter(Arc<dyn Fn(&CellValue) -> String + Send + Sync>);

impl CellFormatter {
    pub fn new(formatter: impl Fn(&CellValue) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(formatter))
    }

    pub fn format(&self, value: &CellValue) -> String {
        (self.0)(value)
    }
}

impl fmt::Debug for CellFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CellFormatter(..)")
    }
}

fn default_true() -> bool {
    true
}

/// Describes one column of a grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,
    #[serde(default, rename = "type")]
    pub column_type: ColumnType,
    /// Non-hideable columns stay visible and show a disabled checkbox.
    #[serde(default = "default_true")]
    pub hideable: bool,
    #[serde(default = "default_true")]
    pub filterable: bool,
    #[serde(default = "default_true")]
    pub sortable: bool,
    /// Date columns compare hours and minutes too when set.
    #[serde(default)]
    pub show_time: bool,
    /// Allowed values of a single-select column.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value_options: Vec<String>,
    /// Restricts the operator list; `None` means the type's default set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_operators: Option<Vec<FilterOperator>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default)]
    pub align: Align,
    #[serde(skip)]
    pub value_getter: Option<ValueGetter>,
    #[serde(skip)]
    pub render_cell: Option<CellFormatter>,
}

impl ColumnDescriptor {
    pub fn new(field: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            field: field.into(),
            header_name: None,
            column_type,
            hideable: true,
            filterable: column_type != ColumnType::Actions,
            sortable: column_type != ColumnType::Actions,
            show_time: false,
            value_options: Vec::new(),
            filter_operators: None,
            width: None,
            align: if column_type == ColumnType::Number {
                Align::Right
            } else {
                Align::Left
            },
            value_getter: None,
            render_cell: None,
        }
    }

    pub fn string(field: impl Into<String>) -> Self {
        Self::new(field, ColumnType::String)
    }

    pub fn number(field: impl Into<String>) -> Self {
        Self::new(field, ColumnType::Number)
    }

    pub fn date(field: impl Into<String>) -> Self {
        Self::new(field, ColumnType::Date)
    }

    pub fn single_select<I, S>(field: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut column = Self::new(field, ColumnType::SingleSelect);
        column.value_options = options.into_iter().map(Into::into).collect();
        column
    }

    pub fn actions(field: impl Into<String>) -> Self {
        Self::new(field, ColumnType::Actions)
    }

    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header_name = Some(header.into());
        self
    }

    #[must_use]
    pub fn not_hideable(mut self) -> Self {
        self.hideable = false;
        self
    }

    #[must_use]
    pub fn with_show_time(mut self, show_time: bool) -> Self {
        self.show_time = show_time;
        self
    }

    #[must_use]
    pub fn with_operators(mut self, operators: Vec<FilterOperator>) -> Self {
        self.filter_operators = Some(operators);
        self
    }

    #[must_use]
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    #[must_use]
    pub fn with_value_getter(
        mut self,
        getter: impl Fn(&Row) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        self.value_getter = Some(ValueGetter::new(getter));
        self
    }

    #[must_use]
    pub fn with_render_cell(
        mut self,
        formatter: impl Fn(&CellValue) -> String + Send + Sync + 'static,
    ) -> Self {
        self.render_cell = Some(CellFormatter::new(formatter));
        self
    }

    /// Header label, falling back to the field name.
    pub fn header(&self) -> &str {
        self.header_name.as_deref().unwrap_or(&self.field)
    }

    pub fn is_filterable(&self) -> bool {
        self.filterable && self.column_type != ColumnType::Actions
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable && self.column_type != ColumnType::Actions
    }

    /// The raw value of this column for a row.
    pub fn value(&self, row: &Row) -> CellValue {
        match &self.value_getter {
            Some(getter) => getter.get(row),
            None => row.get(&self.field).cloned().unwrap_or_default(),
        }
    }

    /// The display text of this column for a row.
    pub fn formatted(&self, row: &Row) -> String {
        let value = self.value(row);
        match &self.render_cell {
            Some(formatter) => formatter.format(&value),
            None => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_columns_are_not_filterable_or_sortable() {
        let column = ColumnDescriptor::actions("actions");
        assert!(!column.is_filterable());
        assert!(!column.is_sortable());
    }

    #[test]
    fn value_getter_overrides_field_lookup() {
        let column = ColumnDescriptor::string("full_name").with_value_getter(|row| {
            let first = row.get("first").map(ToString::to_string).unwrap_or_default();
            let last = row.get("last").map(ToString::to_string).unwrap_or_default();
            CellValue::Text(format!("{first} {last}"))
        });
        let row = Row::new().with("first", "Grace").with("last", "Hopper");
        assert_eq!(column.formatted(&row), "Grace Hopper");
    }

    #[test]
    fn header_falls_back_to_field() {
        assert_eq!(ColumnDescriptor::number("salary").header(), "salary");
        assert_eq!(
            ColumnDescriptor::number("salary").with_header("Salary").header(),
            "Salary"
        );
    }
}
