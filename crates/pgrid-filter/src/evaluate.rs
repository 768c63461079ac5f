//! Filter-model evaluation.
//!
//! Items that cannot constrain anything (unknown column, operator outside the
//! column's set, missing or unparseable value) are dropped before combining,
//! so an incomplete row in the filter panel never hides or reveals rows.

use chrono::{NaiveDateTime, Timelike};
use pgrid_model::{
    CellValue, ColumnDescriptor, ColumnType, FilterItem, FilterModel, FilterOperator, FilterValue,
    LinkOperator, Row, parse_datetime,
};
use tracing::debug;

use crate::operators::is_operator_allowed;

/// Absolute tolerance for numeric equality.
pub const NUMERIC_TOLERANCE: f64 = 1e-9;

pub(crate) fn numbers_equal(left: f64, right: f64) -> bool {
    (left - right).abs() <= NUMERIC_TOLERANCE
}

/// A filter item resolved against its column, ready to test rows.
pub struct CompiledItem<'a> {
    column: &'a ColumnDescriptor,
    item: &'a FilterItem,
}

impl<'a> CompiledItem<'a> {
    /// Resolve an item; `None` when it cannot constrain rows.
    pub fn compile(columns: &'a [ColumnDescriptor], item: &'a FilterItem) -> Option<Self> {
        let Some(column) = columns.iter().find(|c| c.field == item.column_field) else {
            debug!(field = %item.column_field, "dropping filter item for unknown column");
            return None;
        };
        if !is_operator_allowed(column, item.operator_value) {
            debug!(
                field = %item.column_field,
                operator = %item.operator_value,
                "dropping filter item with undeclared operator"
            );
            return None;
        }
        if !item.is_active() {
            return None;
        }
        let compiled = Self { column, item };
        compiled.is_evaluable().then_some(compiled)
    }

    /// Values that fail to parse for the column type leave the item inert.
    fn is_evaluable(&self) -> bool {
        let Some(value) = &self.item.value else {
            return true;
        };
        match self.column.column_type {
            ColumnType::Number => value
                .as_many()
                .iter()
                .all(|text| text.trim().parse::<f64>().is_ok()),
            ColumnType::Date => value
                .as_single()
                .is_some_and(|text| parse_datetime(&text).is_some()),
            _ => true,
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        let cell = self.column.value(row);
        matches_item(self.column, self.item, &cell)
    }
}

/// Test one cell value against one filter item of the given column.
pub fn matches_item(column: &ColumnDescriptor, item: &FilterItem, cell: &CellValue) -> bool {
    let operator = item.operator_value;
    match column.column_type {
        ColumnType::String => string_matches(operator, cell, item.value.as_ref()),
        ColumnType::Number => number_matches(operator, cell, item.value.as_ref()),
        ColumnType::Date => {
            let value = item
                .value
                .as_ref()
                .and_then(FilterValue::as_single)
                .and_then(|text| parse_datetime(&text));
            date_matches(operator, cell, value, column.show_time)
        }
        ColumnType::SingleSelect => select_matches(operator, cell, item.value.as_ref()),
        ColumnType::Actions => true,
    }
}

fn string_matches(operator: FilterOperator, cell: &CellValue, value: Option<&FilterValue>) -> bool {
    match operator {
        FilterOperator::IsEmpty => return cell.is_blank(),
        FilterOperator::IsNotEmpty => return !cell.is_blank(),
        _ => {}
    }
    let Some(value) = value else {
        return true;
    };
    let haystack = cell.to_string().to_lowercase();
    if operator == FilterOperator::IsAnyOf {
        return value
            .as_many()
            .iter()
            .any(|candidate| candidate.to_lowercase() == haystack);
    }
    let needle = value.as_single().unwrap_or_default().to_lowercase();
    match operator {
        FilterOperator::Contains => !cell.is_null() && haystack.contains(&needle),
        FilterOperator::Equals => haystack == needle,
        FilterOperator::StartsWith => !cell.is_null() && haystack.starts_with(&needle),
        FilterOperator::EndsWith => !cell.is_null() && haystack.ends_with(&needle),
        _ => false,
    }
}

fn number_matches(operator: FilterOperator, cell: &CellValue, value: Option<&FilterValue>) -> bool {
    match operator {
        FilterOperator::IsEmpty => return cell.is_null(),
        FilterOperator::IsNotEmpty => return !cell.is_null(),
        _ => {}
    }
    let Some(value) = value else {
        return true;
    };
    let actual = cell.as_f64();
    if operator == FilterOperator::IsAnyOf {
        return actual.is_some_and(|actual| {
            value
                .as_many()
                .iter()
                .filter_map(|text| text.trim().parse::<f64>().ok())
                .any(|candidate| numbers_equal(actual, candidate))
        });
    }
    let Some(expected) = value.as_single().and_then(|text| text.trim().parse::<f64>().ok())
    else {
        return true;
    };
    let Some(actual) = actual else {
        return operator == FilterOperator::NumNe;
    };
    match operator {
        FilterOperator::NumEq => numbers_equal(actual, expected),
        FilterOperator::NumNe => !numbers_equal(actual, expected),
        FilterOperator::Gt => actual > expected,
        FilterOperator::Ge => actual > expected || numbers_equal(actual, expected),
        FilterOperator::Lt => actual < expected,
        FilterOperator::Le => actual < expected || numbers_equal(actual, expected),
        _ => false,
    }
}

/// Truncate to the comparison granularity: whole days, or minutes with `show_time`.
fn truncate(moment: NaiveDateTime, show_time: bool) -> NaiveDateTime {
    let (hour, minute) = if show_time {
        (moment.hour(), moment.minute())
    } else {
        (0, 0)
    };
    moment
        .date()
        .and_hms_opt(hour, minute, 0)
        .unwrap_or(moment)
}

/// Evaluate a date operator.
///
/// `isEmpty`/`isNotEmpty` test strictly for null. Every other operator fails
/// on a null or unparseable cell, and passes when no filter value is given.
pub fn date_matches(
    operator: FilterOperator,
    cell: &CellValue,
    value: Option<NaiveDateTime>,
    show_time: bool,
) -> bool {
    match operator {
        FilterOperator::IsEmpty => return cell.is_null(),
        FilterOperator::IsNotEmpty => return !cell.is_null(),
        _ => {}
    }
    let Some(value) = value else {
        return true;
    };
    let Some(actual) = cell.as_datetime() else {
        return false;
    };
    let actual = truncate(actual, show_time);
    let expected = truncate(value, show_time);
    match operator {
        FilterOperator::Is => actual == expected,
        FilterOperator::Not => actual != expected,
        FilterOperator::After => actual > expected,
        FilterOperator::OnOrAfter => actual >= expected,
        FilterOperator::Before => actual < expected,
        FilterOperator::OnOrBefore => actual <= expected,
        _ => false,
    }
}

fn select_matches(operator: FilterOperator, cell: &CellValue, value: Option<&FilterValue>) -> bool {
    let Some(value) = value else {
        return true;
    };
    let actual = cell.to_string();
    match operator {
        FilterOperator::Is => !cell.is_null() && value.as_single().is_some_and(|v| v == actual),
        FilterOperator::Not => value.as_single().is_none_or(|v| v != actual),
        FilterOperator::IsAnyOf => value.as_many().contains(&actual),
        _ => false,
    }
}

/// Whether a row passes the structured part of a filter model.
///
/// Items are combined with the model's single link operator.
pub fn row_matches_model(columns: &[ColumnDescriptor], model: &FilterModel, row: &Row) -> bool {
    let compiled: Vec<CompiledItem<'_>> = model
        .items
        .iter()
        .filter_map(|item| CompiledItem::compile(columns, item))
        .collect();
    combine(&compiled, model.link_operator, row)
}

fn combine(compiled: &[CompiledItem<'_>], link: LinkOperator, row: &Row) -> bool {
    if compiled.is_empty() {
        return true;
    }
    match link {
        LinkOperator::And => compiled.iter().all(|item| item.matches(row)),
        LinkOperator::Or => compiled.iter().any(|item| item.matches(row)),
    }
}

/// Rows passing the structured filter items, in input order.
pub fn apply_filter_model<'r>(
    columns: &[ColumnDescriptor],
    model: &FilterModel,
    rows: &'r [Row],
) -> Vec<&'r Row> {
    let compiled: Vec<CompiledItem<'_>> = model
        .items
        .iter()
        .filter_map(|item| CompiledItem::compile(columns, item))
        .collect();
    rows.iter()
        .filter(|row| combine(&compiled, model.link_operator, row))
        .collect()
}
