//! Quick filtering: the free-text search box of the toolbar.
//!
//! Each search token is turned into one cell predicate per participating
//! column. A column participates when its type has a default predicate and it
//! is currently visible; the visibility check is layered on top of the
//! per-type factories by [`wrap_quick_filter`].

use pgrid_model::{
    CellValue, ColumnDescriptor, ColumnType, GridViewState, LinkOperator, Row,
};

use crate::evaluate::numbers_equal;

/// Tests a single cell value.
pub type CellPredicate = Box<dyn Fn(&CellValue) -> bool>;

/// The slice of the grid API quick filtering consults at evaluation time.
pub trait GridApi {
    /// Fields of the columns currently shown, in display order.
    fn visible_column_fields(&self) -> Vec<&str>;
}

/// Columns plus the view state that decides which of them are visible.
#[derive(Clone, Copy)]
pub struct ViewSnapshot<'a> {
    pub columns: &'a [ColumnDescriptor],
    pub state: &'a GridViewState,
}

impl GridApi for ViewSnapshot<'_> {
    fn visible_column_fields(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|column| self.state.shows_column(column))
            .map(|column| column.field.as_str())
            .collect()
    }
}

/// Per-type predicate for one token; `None` when the column does not take part.
///
/// - string: case-insensitive substring
/// - number: equality within tolerance, only when the token is numeric
/// - single select: case-insensitive equality
/// - date and actions: no predicate
pub fn default_quick_filter(token: &str, column: &ColumnDescriptor) -> Option<CellPredicate> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    match column.column_type {
        ColumnType::String => {
            let needle = token.to_lowercase();
            Some(Box::new(move |cell: &CellValue| {
                !cell.is_null() && cell.to_string().to_lowercase().contains(&needle)
            }))
        }
        ColumnType::Number => {
            let expected: f64 = token.parse().ok()?;
            Some(Box::new(move |cell: &CellValue| {
                cell.as_f64()
                    .is_some_and(|actual| numbers_equal(actual, expected))
            }))
        }
        ColumnType::SingleSelect => {
            let expected = token.to_lowercase();
            Some(Box::new(move |cell: &CellValue| {
                !cell.is_null() && cell.to_string().to_lowercase() == expected
            }))
        }
        ColumnType::Date | ColumnType::Actions => None,
    }
}

/// Restrict a predicate factory to visible columns.
///
/// The returned factory yields `None` for a hidden column without consulting
/// `factory`, so hidden columns never match even when their data would.
pub fn wrap_quick_filter<F>(
    factory: F,
) -> impl Fn(&str, &ColumnDescriptor, &dyn GridApi) -> Option<CellPredicate>
where
    F: Fn(&str, &ColumnDescriptor) -> Option<CellPredicate>,
{
    move |token: &str, column: &ColumnDescriptor, api: &dyn GridApi| {
        let visible = api.visible_column_fields();
        if !visible.contains(&column.field.as_str()) {
            return None;
        }
        factory(token, column)
    }
}

/// Compiled quick filter for one evaluation pass.
pub struct QuickFilter<'a> {
    columns: &'a [ColumnDescriptor],
    /// Per token: (column index, predicate) for every participating column.
    tokens: Vec<Vec<(usize, CellPredicate)>>,
    logic: LinkOperator,
}

impl<'a> QuickFilter<'a> {
    /// Compile with the default per-type predicates behind the visibility wrapper.
    pub fn compile(
        columns: &'a [ColumnDescriptor],
        tokens: &[&str],
        logic: LinkOperator,
        api: &dyn GridApi,
    ) -> Self {
        Self::compile_with(
            columns,
            tokens,
            logic,
            api,
            wrap_quick_filter(default_quick_filter),
        )
    }

    pub fn compile_with<F>(
        columns: &'a [ColumnDescriptor],
        tokens: &[&str],
        logic: LinkOperator,
        api: &dyn GridApi,
        factory: F,
    ) -> Self
    where
        F: Fn(&str, &ColumnDescriptor, &dyn GridApi) -> Option<CellPredicate>,
    {
        let tokens = tokens
            .iter()
            .copied()
            .map(|token| {
                columns
                    .iter()
                    .enumerate()
                    .filter_map(|(index, column)| {
                        factory(token, column, api).map(|predicate| (index, predicate))
                    })
                    .collect()
            })
            .collect();
        Self {
            columns,
            tokens,
            logic,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn token_matches(&self, predicates: &[(usize, CellPredicate)], row: &Row) -> bool {
        predicates
            .iter()
            .any(|(index, predicate)| predicate(&self.columns[*index].value(row)))
    }

    pub fn matches(&self, row: &Row) -> bool {
        if self.tokens.is_empty() {
            return true;
        }
        match self.logic {
            LinkOperator::And => self
                .tokens
                .iter()
                .all(|predicates| self.token_matches(predicates, row)),
            LinkOperator::Or => self
                .tokens
                .iter()
                .any(|predicates| self.token_matches(predicates, row)),
        }
    }
}

/// Split raw search-box text into quick-filter tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}
