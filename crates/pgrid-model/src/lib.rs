//! Data model for the Profesto data grid.
//!
//! Columns, rows, filter items and the view-state snapshot shared by the
//! filter engine, the persistence layer, the exporter and the grid itself.

pub mod column;
pub mod config;
pub mod error;
pub mod feedback;
pub mod filter;
pub mod source;
pub mod value;
pub mod view_state;

pub use column::{Align, CellFormatter, ColumnDescriptor, ColumnType, ValueGetter};
pub use config::GridConfig;
pub use error::{ModelError, Result};
pub use feedback::{Feedback, RequestFailure};
pub use filter::{FilterItem, FilterModel, FilterOperator, FilterValue, LinkOperator};
pub use source::{DataSource, HttpMethod, RequestOptions, RowPage, RowsPayload};
pub use value::{CellValue, Row, format_number, parse_datetime};
pub use view_state::{
    ColumnDimensions, ColumnVisibilityModel, ColumnsState, DEFAULT_PAGE_SIZE, FilterState,
    GridViewState, PaginationState, PinnedColumns, PreferencePanel, PreferencePanelState,
    SortDirection, SortItem, SortingState,
};
