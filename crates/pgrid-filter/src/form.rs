//! Filter panel and per-row filter form.
//!
//! The panel owns the filter model while it is being edited. Rows are only
//! shown while the panel is open; deleting the last row closes it, so an open
//! panel always shows at least one row.

use pgrid_model::{
    ColumnDescriptor, FilterItem, FilterModel, FilterOperator, FilterValue, LinkOperator,
};
use tracing::debug;

use crate::error::{FilterError, Result};
use crate::operators::{input_kind, operators_for};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPanel {
    model: FilterModel,
    open: bool,
}

impl FilterPanel {
    pub fn new(model: FilterModel) -> Self {
        Self { model, open: false }
    }

    pub fn model(&self) -> &FilterModel {
        &self.model
    }

    pub fn into_model(self) -> FilterModel {
        self.model
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Rows rendered by the panel; empty while closed.
    pub fn visible_rows(&self) -> &[FilterItem] {
        if self.open { &self.model.items } else { &[] }
    }

    /// Open the panel, seeding a default row when the model has none.
    pub fn open(&mut self, columns: &[ColumnDescriptor]) -> Result<()> {
        if self.model.items.is_empty() {
            self.push_default_item(columns)?;
        }
        self.open = true;
        Ok(())
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Append a row seeded with the first filterable column and its first operator.
    pub fn add_filter(&mut self, columns: &[ColumnDescriptor]) -> Result<u64> {
        let id = self.push_default_item(columns)?;
        self.open = true;
        Ok(id)
    }

    fn push_default_item(&mut self, columns: &[ColumnDescriptor]) -> Result<u64> {
        let (column, operator) = columns
            .iter()
            .find_map(|column| {
                operators_for(column)
                    .first()
                    .map(|operator| (column, *operator))
            })
            .ok_or(FilterError::NoFilterableColumns)?;
        let id = self.model.next_item_id();
        self.model
            .items
            .push(FilterItem::new(id, column.field.clone(), operator));
        debug!(id, field = %column.field, operator = %operator, "filter row added");
        Ok(id)
    }

    /// Remove a row. Removing the last row closes the panel.
    pub fn delete_filter(&mut self, id: u64) -> Result<()> {
        let position = self
            .model
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(FilterError::UnknownItem(id))?;
        self.model.items.remove(position);
        if self.model.items.is_empty() {
            self.open = false;
        }
        Ok(())
    }

    /// Remove every row and close the panel.
    pub fn clear(&mut self) {
        self.model.items.clear();
        self.open = false;
    }

    /// Point a row at another column.
    ///
    /// The operator is kept when the new column declares it, otherwise the new
    /// column's first operator is used. The value survives only if the input
    /// widget kind is unchanged.
    pub fn change_column(
        &mut self,
        id: u64,
        field: &str,
        columns: &[ColumnDescriptor],
    ) -> Result<()> {
        let new_column = find_column(columns, field)?;
        let operators = operators_for(new_column);
        if operators.is_empty() {
            return Err(FilterError::NotFilterable(field.to_string()));
        }
        let item = self
            .model
            .item_mut(id)
            .ok_or(FilterError::UnknownItem(id))?;
        let old_kind = columns
            .iter()
            .find(|column| column.field == item.column_field)
            .map(|column| input_kind(column, item.operator_value));
        let operator = if operators.contains(&item.operator_value) {
            item.operator_value
        } else {
            operators[0]
        };
        let new_kind = input_kind(new_column, operator);
        if old_kind != Some(new_kind) {
            item.value = None;
        }
        item.column_field = new_column.field.clone();
        item.operator_value = operator;
        debug!(id, field, operator = %operator, "filter row column changed");
        Ok(())
    }

    /// Select another operator for a row, erasing the value if the input kind changes.
    pub fn change_operator(
        &mut self,
        id: u64,
        operator: FilterOperator,
        columns: &[ColumnDescriptor],
    ) -> Result<()> {
        let item = self
            .model
            .item_mut(id)
            .ok_or(FilterError::UnknownItem(id))?;
        let column = find_column(columns, &item.column_field)?;
        if !operators_for(column).contains(&operator) {
            return Err(FilterError::OperatorNotAllowed {
                field: column.field.clone(),
                operator,
            });
        }
        if input_kind(column, item.operator_value) != input_kind(column, operator) {
            item.value = None;
        }
        item.operator_value = operator;
        Ok(())
    }

    /// Set the value typed into a row's input.
    pub fn change_value(&mut self, id: u64, value: Option<FilterValue>) -> Result<()> {
        let item = self
            .model
            .item_mut(id)
            .ok_or(FilterError::UnknownItem(id))?;
        if value.is_some() && !item.operator_value.requires_value() {
            return Err(FilterError::ValueNotAccepted(item.operator_value));
        }
        item.value = value;
        Ok(())
    }

    /// The link operator is global to the model.
    pub fn change_link_operator(&mut self, link: LinkOperator) {
        self.model.link_operator = link;
    }
}

fn find_column<'a>(columns: &'a [ColumnDescriptor], field: &str) -> Result<&'a ColumnDescriptor> {
    columns
        .iter()
        .find(|column| column.field == field)
        .ok_or_else(|| FilterError::UnknownColumn(field.to_string()))
}
