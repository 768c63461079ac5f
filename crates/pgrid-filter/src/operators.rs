//! Operator catalogue and value-input kinds.

use pgrid_model::{ColumnDescriptor, ColumnType, FilterOperator};

const STRING_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Contains,
    FilterOperator::Equals,
    FilterOperator::StartsWith,
    FilterOperator::EndsWith,
    FilterOperator::IsEmpty,
    FilterOperator::IsNotEmpty,
    FilterOperator::IsAnyOf,
];

const NUMBER_OPERATORS: &[FilterOperator] = &[
    FilterOperator::NumEq,
    FilterOperator::NumNe,
    FilterOperator::Gt,
    FilterOperator::Ge,
    FilterOperator::Lt,
    FilterOperator::Le,
    FilterOperator::IsEmpty,
    FilterOperator::IsNotEmpty,
    FilterOperator::IsAnyOf,
];

/// Calendar operators used by every date column.
pub const DATE_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Is,
    FilterOperator::Not,
    FilterOperator::After,
    FilterOperator::OnOrAfter,
    FilterOperator::Before,
    FilterOperator::OnOrBefore,
    FilterOperator::IsEmpty,
    FilterOperator::IsNotEmpty,
];

const SINGLE_SELECT_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Is,
    FilterOperator::Not,
    FilterOperator::IsAnyOf,
];

/// Default operators for a column type.
pub fn default_operators(column_type: ColumnType) -> &'static [FilterOperator] {
    match column_type {
        ColumnType::String => STRING_OPERATORS,
        ColumnType::Number => NUMBER_OPERATORS,
        ColumnType::Date => DATE_OPERATORS,
        ColumnType::SingleSelect => SINGLE_SELECT_OPERATORS,
        ColumnType::Actions => &[],
    }
}

/// Operators a filter row may select for this column, in declaration order.
///
/// Columns that are not filterable have none.
pub fn operators_for(column: &ColumnDescriptor) -> Vec<FilterOperator> {
    if !column.is_filterable() {
        return Vec::new();
    }
    match &column.filter_operators {
        Some(declared) => declared.clone(),
        None => default_operators(column.column_type).to_vec(),
    }
}

pub fn is_operator_allowed(column: &ColumnDescriptor, operator: FilterOperator) -> bool {
    operators_for(column).contains(&operator)
}

/// The kind of input widget a filter row shows for an operator.
///
/// Two rows with equal kinds can carry the same typed value over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// No value input (`isEmpty`, `isNotEmpty`).
    None,
    Text,
    Number,
    Date,
    DateTime,
    SingleSelect,
    MultiText,
    MultiNumber,
    MultiSelect,
}

pub fn input_kind(column: &ColumnDescriptor, operator: FilterOperator) -> InputKind {
    if !operator.requires_value() {
        return InputKind::None;
    }
    let many = operator == FilterOperator::IsAnyOf;
    match column.column_type {
        ColumnType::String if many => InputKind::MultiText,
        ColumnType::String => InputKind::Text,
        ColumnType::Number if many => InputKind::MultiNumber,
        ColumnType::Number => InputKind::Number,
        ColumnType::Date if column.show_time => InputKind::DateTime,
        ColumnType::Date => InputKind::Date,
        ColumnType::SingleSelect if many => InputKind::MultiSelect,
        ColumnType::SingleSelect => InputKind::SingleSelect,
        ColumnType::Actions => InputKind::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_columns_get_calendar_operators() {
        let column = ColumnDescriptor::date("hired");
        assert_eq!(operators_for(&column), DATE_OPERATORS);
    }

    #[test]
    fn declared_operators_override_defaults() {
        let column = ColumnDescriptor::string("name")
            .with_operators(vec![FilterOperator::Equals, FilterOperator::IsEmpty]);
        assert_eq!(
            operators_for(&column),
            vec![FilterOperator::Equals, FilterOperator::IsEmpty]
        );
        assert!(!is_operator_allowed(&column, FilterOperator::Contains));
    }

    #[test]
    fn actions_have_no_operators() {
        assert!(operators_for(&ColumnDescriptor::actions("actions")).is_empty());
    }

    #[test]
    fn input_kinds_follow_type_and_operator() {
        let name = ColumnDescriptor::string("name");
        assert_eq!(input_kind(&name, FilterOperator::Contains), InputKind::Text);
        assert_eq!(input_kind(&name, FilterOperator::IsAnyOf), InputKind::MultiText);
        assert_eq!(input_kind(&name, FilterOperator::IsEmpty), InputKind::None);

        let hired = ColumnDescriptor::date("hired");
        assert_eq!(input_kind(&hired, FilterOperator::After), InputKind::Date);
        let clocked = ColumnDescriptor::date("clock_in").with_show_time(true);
        assert_eq!(input_kind(&clocked, FilterOperator::After), InputKind::DateTime);
    }
}
