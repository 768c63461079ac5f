//! Filtering for the Profesto data grid.
//!
//! - `operators` - operator catalogue per column type and input-widget kinds
//! - `evaluate` - structured filter items joined by a global link operator
//! - `quick` - search-box tokens matched against visible columns only
//! - `sort` - multi-key sort model application
//! - `form` - filter panel rows and their transitions

mod error;
mod evaluate;
mod form;
mod operators;
mod pipeline;
mod quick;
mod sort;

pub use error::{FilterError, Result};
pub use evaluate::{
    CompiledItem, NUMERIC_TOLERANCE, apply_filter_model, date_matches, matches_item,
    row_matches_model,
};
pub use form::FilterPanel;
pub use operators::{
    DATE_OPERATORS, InputKind, default_operators, input_kind, is_operator_allowed, operators_for,
};
pub use pipeline::{filter_and_sort, filter_and_sort_with};
pub use quick::{
    CellPredicate, GridApi, QuickFilter, ViewSnapshot, default_quick_filter, tokenize,
    wrap_quick_filter,
};
pub use sort::{compare_cells, sort_rows};
