//! Filter, quick-filter and sort in one pass.

use pgrid_model::{ColumnDescriptor, GridViewState, Row};

use crate::evaluate::apply_filter_model;
use crate::quick::{
    CellPredicate, QuickFilter, ViewSnapshot, default_quick_filter, wrap_quick_filter,
};
use crate::sort::sort_rows;

/// Rows that pass the view state's filter model and quick filter, sorted by
/// its sort model.
pub fn filter_and_sort<'r>(
    columns: &[ColumnDescriptor],
    state: &GridViewState,
    rows: &'r [Row],
) -> Vec<&'r Row> {
    filter_and_sort_with(columns, state, rows, default_quick_filter, |_| true)
}

/// Like [`filter_and_sort`] with a caller-supplied per-type quick-filter
/// factory and an extra row predicate.
///
/// The factory is wrapped so hidden columns never participate.
pub fn filter_and_sort_with<'r, F, P>(
    columns: &[ColumnDescriptor],
    state: &GridViewState,
    rows: &'r [Row],
    factory: F,
    keep: P,
) -> Vec<&'r Row>
where
    F: Fn(&str, &ColumnDescriptor) -> Option<CellPredicate>,
    P: Fn(&Row) -> bool,
{
    let model = state.filter_model();
    let mut kept = apply_filter_model(columns, model, rows);
    kept.retain(|row| keep(row));

    let tokens = model.quick_tokens();
    if !tokens.is_empty() {
        let api = ViewSnapshot { columns, state };
        let quick = QuickFilter::compile_with(
            columns,
            &tokens,
            model.quick_filter_logic_operator,
            &api,
            wrap_quick_filter(factory),
        );
        kept.retain(|row| quick.matches(row));
    }

    sort_rows(columns, state.sort_model(), &mut kept);
    kept
}

#[cfg(test)]
mod tests {
    use pgrid_model::{CellValue, SortItem};

    use super::*;

    #[test]
    fn hidden_column_matches_are_dropped_before_sorting() {
        let columns = vec![
            ColumnDescriptor::string("name"),
            ColumnDescriptor::string("ssn"),
        ];
        let rows = vec![
            Row::new().with("name", "Zed").with("ssn", "123"),
            Row::new().with("name", "Amy 123").with("ssn", "999"),
            Row::new().with("name", "Bob 123").with("ssn", CellValue::Null),
        ];
        let mut state = GridViewState::default();
        state.filter.filter_model.quick_filter_values = Some(vec!["123".into()]);
        state.sorting.sort_model = vec![SortItem::asc("name")];

        assert_eq!(filter_and_sort(&columns, &state, &rows).len(), 3);

        state
            .columns
            .column_visibility_model
            .insert("ssn".into(), false);
        let kept = filter_and_sort(&columns, &state, &rows);
        let names: Vec<String> = kept
            .iter()
            .map(|row| columns[0].formatted(row))
            .collect();
        assert_eq!(names, vec!["Amy 123", "Bob 123"]);
    }

    #[test]
    fn extra_predicate_applies() {
        let columns = vec![ColumnDescriptor::string("name")];
        let rows = vec![Row::new().with("name", "a"), Row::new().with("name", "b")];
        let kept = filter_and_sort_with(
            &columns,
            &GridViewState::default(),
            &rows,
            default_quick_filter,
            |row| row.get("name") == Some(&CellValue::text("b")),
        );
        assert_eq!(kept.len(), 1);
    }
}
