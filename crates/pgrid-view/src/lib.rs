//! Headless data grid for Profesto list pages.
//!
//! - `grid` - mount/unmount lifecycle, view-state changes and derived rows
//! - `toolbar` - toolbar composition from options and capabilities
//! - `columns_panel` - column visibility panel
//! - `overflow` - single-line cells that expand into a tooltip on overflow
//! - `extensions` - named per-call-site extension points

mod columns_panel;
mod error;
mod extensions;
mod grid;
mod overflow;
mod toolbar;
mod toolbar_filters;

pub use columns_panel::{ColumnEntry, ColumnsPanel};
pub use error::{Result, ViewError};
pub use extensions::{DEFAULT_NO_ROWS_TEXT, GridExtensions, GridExtensionsBuilder};
pub use grid::{DataGrid, GridEvent, GridProps, QUICK_FILTER_DEBOUNCE};
pub use overflow::{
    CellRender, ContentMetrics, DEFAULT_COLUMN_WIDTH, KeyEvent, MeasureContent, MonospaceMeasure,
    OverflowCell, TooltipPlacement,
};
pub use toolbar::{
    Capabilities, FilterButtonState, Toolbar, ToolbarInput, ToolbarItem, ToolbarOptions,
    compose_toolbar,
};
pub use toolbar_filters::{CustomFilter, DateRangeFilter};
