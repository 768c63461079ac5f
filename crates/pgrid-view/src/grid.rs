//! The data grid: lifecycle, view state and derived rows.
//!
//! Every change to the view state is published as a [`GridEvent`]. While the
//! grid persists its state, a subscription feeds each snapshot into a
//! [`PersistenceSession`], which writes once on unmount.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use pgrid_export::{
    ExportChoice, ExportControl, ExportError, ExportOutcome, ExportRequest, ExportSource,
    export_workbook,
};
use pgrid_filter::{FilterPanel, default_quick_filter, filter_and_sort_with, tokenize};
use pgrid_model::{
    ColumnDescriptor, ColumnVisibilityModel, FilterModel, GridConfig, GridViewState, LinkOperator,
    PaginationState, PinnedColumns, PreferencePanel, PreferencePanelState, Row, RowsPayload,
    SortItem,
};
use pgrid_state::{
    Clock, Debouncer, Observers, PersistenceSession, QueryParams, SharedStore, Subscription,
};
use tracing::{debug, info, warn};

use crate::columns_panel::{ColumnEntry, ColumnsPanel};
use crate::error::{Result, ViewError};
use crate::extensions::GridExtensions;
use crate::overflow::OverflowCell;
use crate::toolbar::{Capabilities, Toolbar, ToolbarInput, ToolbarOptions, compose_toolbar};
use crate::toolbar_filters::{CustomFilter, DateRangeFilter};

/// Delay between the last keystroke in the search box and the filter update.
pub const QUICK_FILTER_DEBOUNCE: Duration = Duration::from_millis(500);

/// Notifications published by a mounted grid.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    StateChange(Rc<GridViewState>),
    PreferencePanelChange(Option<PreferencePanelState>),
}

/// Everything a call site hands to [`DataGrid::mount`].
#[derive(Debug, Clone)]
pub struct GridProps {
    pub config: GridConfig,
    pub rows: Vec<Row>,
    /// Total reported by the row source; defaults to `rows.len()`.
    pub total: Option<usize>,
    pub query: QueryParams,
    pub toolbar: ToolbarOptions,
    pub capabilities: Capabilities,
    pub date_range: Option<DateRangeFilter>,
    pub custom_filters: Vec<CustomFilter>,
    pub extensions: GridExtensions,
}

impl GridProps {
    pub fn new(config: GridConfig, rows: Vec<Row>) -> Self {
        Self {
            config,
            rows,
            total: None,
            query: QueryParams::default(),
            toolbar: ToolbarOptions::default(),
            capabilities: Capabilities::all(),
            date_range: None,
            custom_filters: Vec::new(),
            extensions: GridExtensions::default(),
        }
    }

    /// Props fed by a row-source response.
    pub fn from_payload(config: GridConfig, payload: RowsPayload) -> Self {
        let page = payload.into_page();
        Self {
            total: Some(page.total),
            ..Self::new(config, page.rows)
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_toolbar(mut self, toolbar: ToolbarOptions) -> Self {
        self.toolbar = toolbar;
        self
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    #[must_use]
    pub fn with_date_range(mut self, range: DateRangeFilter) -> Self {
        self.date_range = Some(range);
        self
    }

    #[must_use]
    pub fn with_custom_filter(mut self, filter: CustomFilter) -> Self {
        self.custom_filters.push(filter);
        self
    }

    #[must_use]
    pub fn with_extensions(mut self, extensions: GridExtensions) -> Self {
        self.extensions = extensions;
        self
    }
}

type SessionSlot = Rc<RefCell<Option<PersistenceSession>>>;

pub struct DataGrid {
    config: GridConfig,
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Row>,
    total: usize,
    state: GridViewState,
    toolbar: ToolbarOptions,
    capabilities: Capabilities,
    date_range: Option<DateRangeFilter>,
    custom_filters: Vec<CustomFilter>,
    extensions: GridExtensions,
    events: Observers<GridEvent>,
    session: SessionSlot,
    persistence: Option<Subscription>,
    quick_text: String,
    quick_debounce: Debouncer<String>,
    filter_panel: FilterPanel,
    columns_panel: Option<ColumnsPanel>,
    export_control: Option<ExportControl>,
}

impl DataGrid {
    /// Mount a grid, restoring its persisted view state when it has one.
    ///
    /// A stored snapshot that cannot be read is logged and ignored; the grid
    /// starts from its initial state and the damaged document is replaced on
    /// unmount.
    pub fn mount(props: GridProps, store: SharedStore, clock: Rc<dyn Clock>) -> Result<Self> {
        let GridProps {
            config,
            rows,
            total,
            query,
            toolbar,
            capabilities,
            date_range,
            custom_filters,
            extensions,
        } = props;
        config.validate()?;
        if let Some(range) = &date_range {
            config.require_column(&range.field)?;
        }
        for filter in &custom_filters {
            config.require_column(&filter.field)?;
        }

        let mut columns = config.columns.clone();
        extensions.apply_formatters(&mut columns);

        let mut state = config.initial_state.clone().unwrap_or_default();
        let session = PersistenceSession::start(&config, &query, store);
        let mut restored = false;
        if let Some(session) = &session {
            match session.restore() {
                Ok(Some(stored)) => {
                    state = stored;
                    restored = true;
                }
                Ok(None) => {}
                Err(error) => warn!(
                    key = session.key(),
                    error = %error,
                    suggestion = error.suggestion().as_deref().unwrap_or_default(),
                    "ignoring stored view state"
                ),
            }
        }

        // Non-hideable columns stay shown whatever a stored model says.
        state.columns.column_visibility_model.retain(|field, visible| {
            *visible || config.column(field).is_none_or(|column| column.hideable)
        });

        let session: SessionSlot = Rc::new(RefCell::new(session));
        let events = Observers::new();
        let persistence = session.borrow().is_some().then(|| {
            let slot = Rc::clone(&session);
            events.subscribe(move |event: &GridEvent| {
                if let GridEvent::StateChange(snapshot) = event
                    && let Some(session) = slot.borrow_mut().as_mut()
                {
                    session.observe(snapshot);
                }
            })
        });

        let export_control = (toolbar.enable_exports && capabilities.can_export).then(|| {
            let options = toolbar.excel_options.clone();
            match toolbar.direct_export {
                Some(all_columns) => ExportControl::direct(options, all_columns),
                None => ExportControl::menu(options),
            }
        });
        let quick_text = state.filter_model().quick_tokens().join(" ");

        info!(
            grid = config.name.as_deref().unwrap_or_default(),
            rows = rows.len(),
            restored,
            persisted = persistence.is_some(),
            "grid mounted"
        );
        Ok(Self {
            filter_panel: FilterPanel::new(state.filter.filter_model.clone()),
            total: total.unwrap_or(rows.len()),
            config,
            columns,
            rows,
            state,
            toolbar,
            capabilities,
            date_range,
            custom_filters,
            extensions,
            events,
            session,
            persistence,
            quick_text,
            quick_debounce: Debouncer::new(QUICK_FILTER_DEBOUNCE, clock),
            columns_panel: None,
            export_control,
        })
    }

    /// Unmount, writing the last observed view state.
    ///
    /// Returns whether the store was written.
    pub fn unmount(mut self) -> Result<bool> {
        self.quick_debounce.cancel();
        if let Some(subscription) = self.persistence.take() {
            subscription.dispose();
        }
        let session = self.session.borrow_mut().take();
        info!(
            grid = self.config.name.as_deref().unwrap_or_default(),
            "grid unmounted"
        );
        match session {
            Some(session) => Ok(session.finish()?),
            None => Ok(false),
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Columns with extension formatters installed.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column(&self, field: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.field == field)
    }

    pub fn state(&self) -> &GridViewState {
        &self.state
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row count reported by the row source.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_persisted(&self) -> bool {
        self.persistence.is_some()
    }

    /// Replace the rows with a fresh row-source response. View state is kept.
    pub fn set_rows(&mut self, payload: RowsPayload) {
        let page = payload.into_page();
        debug!(rows = page.rows.len(), total = page.total, "rows replaced");
        self.rows = page.rows;
        self.total = page.total;
    }

    pub fn subscribe(&self, callback: impl FnMut(&GridEvent) + 'static) -> Subscription {
        self.events.subscribe(callback)
    }

    // View-state changes

    pub fn set_sort_model(&mut self, model: Vec<SortItem>) -> Result<()> {
        self.require_fields(model.iter().map(|item| item.field.as_str()))?;
        if self.state.sorting.sort_model == model {
            return Ok(());
        }
        self.state.sorting.sort_model = model;
        self.notify();
        Ok(())
    }

    /// Replace the structured filters and quick-filter values.
    pub fn set_filter_model(&mut self, model: FilterModel) -> Result<()> {
        let reopen = self.filter_panel.is_open();
        self.quick_debounce.cancel();
        self.quick_text = model.quick_tokens().join(" ");
        self.filter_panel = FilterPanel::new(model);
        if reopen {
            self.filter_panel.open(&self.columns)?;
        }
        self.state.filter.filter_model = self.filter_panel.model().clone();
        self.reset_page();
        self.notify();
        Ok(())
    }

    /// Non-hideable columns cannot be hidden; such entries are dropped.
    pub fn set_column_visibility_model(&mut self, mut model: ColumnVisibilityModel) {
        model.retain(|field, visible| {
            *visible || self.column(field).is_none_or(|column| column.hideable)
        });
        if self.state.columns.column_visibility_model == model {
            return;
        }
        self.state.columns.column_visibility_model = model;
        self.notify();
    }

    pub fn set_pinned_columns(&mut self, pinned: PinnedColumns) -> Result<()> {
        self.require_fields(pinned.left.iter().chain(&pinned.right).map(String::as_str))?;
        if self.state.pinned_columns == pinned {
            return Ok(());
        }
        self.state.pinned_columns = pinned;
        self.notify();
        Ok(())
    }

    pub fn set_pagination(&mut self, pagination: PaginationState) {
        let pagination = PaginationState {
            page_size: pagination.page_size.max(1),
            ..pagination
        };
        if self.state.pagination == Some(pagination) {
            return;
        }
        self.state.pagination = Some(pagination);
        self.notify();
    }

    /// Open or close the filters or columns panel.
    pub fn set_preference_panel(&mut self, panel: Option<PreferencePanelState>) -> Result<()> {
        let opened = panel
            .filter(|panel| panel.open)
            .and_then(|panel| panel.opened_panel_value);
        match opened {
            Some(PreferencePanel::Filters) => {
                self.columns_panel = None;
                self.filter_panel.open(&self.columns)?;
                self.sync_filter_items();
            }
            Some(PreferencePanel::Columns) => {
                self.filter_panel.close();
                if self.columns_panel.is_none() {
                    self.columns_panel = Some(ColumnsPanel::mount());
                }
            }
            None => {
                self.filter_panel.close();
                self.columns_panel = None;
            }
        }
        if self.state.preference_panel != panel {
            self.state.preference_panel = panel;
            self.events.publish(&GridEvent::PreferencePanelChange(panel));
        }
        self.notify();
        Ok(())
    }

    pub fn open_filter_panel(&mut self) -> Result<()> {
        self.set_preference_panel(Some(opened(PreferencePanel::Filters)))
    }

    pub fn open_columns_panel(&mut self) -> Result<()> {
        self.set_preference_panel(Some(opened(PreferencePanel::Columns)))
    }

    pub fn close_preference_panel(&mut self) -> Result<()> {
        self.set_preference_panel(Some(PreferencePanelState::default()))
    }

    // Filter panel

    pub fn filter_panel(&self) -> &FilterPanel {
        &self.filter_panel
    }

    /// Run one filter-panel transition and apply the edited model.
    ///
    /// ```ignore
    /// let id = grid.edit_filters(|panel, columns| panel.add_filter(columns))?;
    /// ```
    pub fn edit_filters<T>(
        &mut self,
        edit: impl FnOnce(&mut FilterPanel, &[ColumnDescriptor]) -> pgrid_filter::Result<T>,
    ) -> Result<T> {
        let was_open = self.filter_panel.is_open();
        let outcome = edit(&mut self.filter_panel, &self.columns)?;
        let items_changed = self.sync_filter_items();
        let is_open = self.filter_panel.is_open();
        if was_open != is_open {
            let panel = if is_open {
                opened(PreferencePanel::Filters)
            } else {
                PreferencePanelState::default()
            };
            if is_open {
                self.columns_panel = None;
            }
            self.state.preference_panel = Some(panel);
            self.events
                .publish(&GridEvent::PreferencePanelChange(Some(panel)));
        }
        if items_changed || was_open != is_open {
            self.notify();
        }
        Ok(outcome)
    }

    /// Drop every structured filter, as the filter button's clear glyph does.
    pub fn clear_filters(&mut self) -> Result<()> {
        self.edit_filters(|panel, _| {
            panel.clear();
            Ok(())
        })
    }

    // Columns panel

    pub fn columns_panel(&self) -> Option<&ColumnsPanel> {
        self.columns_panel.as_ref()
    }

    pub fn columns_panel_mut(&mut self) -> Option<&mut ColumnsPanel> {
        self.columns_panel.as_mut()
    }

    /// Checkbox rows, narrowed by the open panel's search text.
    pub fn column_entries(&self) -> Vec<ColumnEntry> {
        let fallback = ColumnsPanel::default();
        self.columns_panel
            .as_ref()
            .unwrap_or(&fallback)
            .entries(&self.columns, &self.state.columns.column_visibility_model)
    }

    pub fn toggle_column(&mut self, field: &str) -> Result<()> {
        let next = ColumnsPanel::default().toggle(
            &self.columns,
            &self.state.columns.column_visibility_model,
            field,
        )?;
        self.set_column_visibility_model(next);
        Ok(())
    }

    pub fn show_all_columns(&mut self) {
        self.set_column_visibility_model(ColumnsPanel::default().select_all());
    }

    pub fn hide_all_columns(&mut self) {
        let hidden = ColumnsPanel::default().clear_all(&self.columns);
        self.set_column_visibility_model(hidden);
    }

    // Quick filter

    /// Raw search-box text. The filter follows after [`QUICK_FILTER_DEBOUNCE`].
    pub fn quick_text(&self) -> &str {
        &self.quick_text
    }

    pub fn type_quick_filter(&mut self, text: impl Into<String>) {
        self.quick_text = text.into();
        self.quick_debounce.schedule(self.quick_text.clone());
    }

    /// Apply a debounced search once its delay has passed.
    ///
    /// Returns whether the quick-filter values changed.
    pub fn tick(&mut self) -> bool {
        match self.quick_debounce.poll() {
            Some(text) => self.apply_quick_filter(&text),
            None => false,
        }
    }

    pub fn set_quick_filter_logic(&mut self, link: LinkOperator) {
        let model = &mut self.state.filter.filter_model;
        if model.quick_filter_logic_operator == link {
            return;
        }
        model.quick_filter_logic_operator = link;
        self.notify();
    }

    fn apply_quick_filter(&mut self, text: &str) -> bool {
        let tokens = tokenize(text);
        let values = (!tokens.is_empty()).then_some(tokens);
        if self.state.filter.filter_model.quick_filter_values == values {
            return false;
        }
        debug!(tokens = ?values, "quick filter applied");
        self.state.filter.filter_model.quick_filter_values = values;
        self.reset_page();
        self.notify();
        true
    }

    // Toolbar filters

    pub fn set_date_range(&mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<()> {
        let range = self.date_range.as_mut().ok_or(ViewError::NoDateRange)?;
        range.set_range(from, to)?;
        self.reset_page();
        Ok(())
    }

    pub fn select_custom_filter(&mut self, key: &str, value: Option<&str>) -> Result<()> {
        let filter = self
            .custom_filters
            .iter_mut()
            .find(|filter| filter.key == key)
            .ok_or_else(|| ViewError::UnknownCustomFilter(key.to_string()))?;
        filter.select(value)?;
        self.reset_page();
        Ok(())
    }

    pub fn toolbar(&self) -> Toolbar {
        compose_toolbar(&ToolbarInput {
            options: &self.toolbar,
            capabilities: self.capabilities,
            filter_model: self.state.filter_model(),
            quick_text: &self.quick_text,
            date_range: self.date_range.as_ref(),
            custom_filters: &self.custom_filters,
        })
    }

    // Derived rows and columns

    /// Visible columns: pinned left, unpinned, pinned right.
    pub fn visible_columns(&self) -> Vec<&ColumnDescriptor> {
        let mut visible: Vec<&ColumnDescriptor> = self
            .columns
            .iter()
            .filter(|column| self.state.shows_column(column))
            .collect();
        let order = &self.state.columns.ordered_fields;
        if !order.is_empty() {
            visible.sort_by_key(|column| {
                order
                    .iter()
                    .position(|field| *field == column.field)
                    .unwrap_or(usize::MAX)
            });
        }
        let pinned = &self.state.pinned_columns;
        visible.sort_by_key(|column| {
            let position = |side: &[String]| side.iter().position(|field| *field == column.field);
            match (position(&pinned.left), position(&pinned.right)) {
                (Some(index), _) => (0, index),
                (None, Some(index)) => (2, index),
                (None, None) => (1, 0),
            }
        });
        visible
    }

    /// Rows passing every filter, in sort order.
    pub fn visible_rows(&self) -> Vec<&Row> {
        let custom = self.extensions.quick_filter();
        let factory = |token: &str, column: &ColumnDescriptor| match custom {
            Some(factory) => factory(token, column),
            None => default_quick_filter(token, column),
        };
        let range = self
            .date_range
            .as_ref()
            .filter(|range| range.is_set())
            .and_then(|range| self.column(&range.field).map(|column| (range, column)));
        let selects: Vec<(&CustomFilter, &ColumnDescriptor)> = self
            .custom_filters
            .iter()
            .filter(|filter| filter.selected.is_some())
            .filter_map(|filter| self.column(&filter.field).map(|column| (filter, column)))
            .collect();
        let keep = |row: &Row| {
            range.is_none_or(|(range, column)| range.matches(column, row))
                && selects.iter().all(|(filter, column)| filter.matches(column, row))
        };
        filter_and_sort_with(&self.columns, &self.state, &self.rows, factory, keep)
    }

    /// The current page of [`visible_rows`](Self::visible_rows).
    pub fn page_rows(&self) -> Vec<&Row> {
        let rows = self.visible_rows();
        match self.state.pagination {
            Some(page) => rows
                .into_iter()
                .skip(page.page * page.page_size)
                .take(page.page_size)
                .collect(),
            None => rows,
        }
    }

    pub fn page_count(&self) -> usize {
        let rows = self.visible_rows().len();
        match self.state.pagination {
            Some(page) => rows.div_ceil(page.page_size).max(1),
            None => 1,
        }
    }

    /// Overlay text when no row survives filtering.
    pub fn no_rows_overlay(&self) -> Option<&str> {
        self.visible_rows()
            .is_empty()
            .then(|| self.extensions.no_rows_overlay_text())
    }

    pub fn cell(&self, row: &Row, field: &str) -> Option<OverflowCell> {
        self.column(field)
            .map(|column| OverflowCell::for_column(column, row))
    }

    // Export

    pub fn export_control(&self) -> Option<&ExportControl> {
        self.export_control.as_ref()
    }

    /// Press the toolbar export control.
    pub fn press_export(&mut self, now: NaiveDateTime) -> Result<Option<ExportRequest>> {
        let control = self
            .export_control
            .as_mut()
            .ok_or(ViewError::ExportsDisabled)?;
        Ok(control.press(now))
    }

    /// Pick an entry of the open export menu.
    pub fn choose_export(
        &mut self,
        choice: ExportChoice,
        now: NaiveDateTime,
    ) -> Result<ExportRequest> {
        let menu = self
            .export_control
            .as_mut()
            .ok_or(ViewError::ExportsDisabled)?
            .as_menu_mut()
            .ok_or(ExportError::MenuClosed)?;
        Ok(menu.choose(choice, now)?)
    }

    /// Build the workbook for the filtered, sorted rows.
    pub fn export(&self, request: &ExportRequest) -> Result<ExportOutcome> {
        if self.export_control.is_none() {
            return Err(ViewError::ExportsDisabled);
        }
        let source = ExportSource {
            all_columns: self.columns.iter().collect(),
            visible_columns: self.visible_columns(),
            rows: self.visible_rows(),
        };
        let outcome = export_workbook(&source, request, self.extensions.export_hooks())?;
        info!(
            file = %outcome.file_name,
            rows = outcome.row_count,
            columns = outcome.column_count,
            all_columns = request.all_columns,
            "grid exported"
        );
        Ok(outcome)
    }

    fn require_fields<'f>(&self, mut fields: impl Iterator<Item = &'f str>) -> Result<()> {
        match fields.find(|field| self.column(field).is_none()) {
            Some(field) => Err(ViewError::UnknownColumn(field.to_string())),
            None => Ok(()),
        }
    }

    /// Copy the panel's rows and link operator into the view state.
    fn sync_filter_items(&mut self) -> bool {
        let edited = self.filter_panel.model();
        let model = &mut self.state.filter.filter_model;
        if model.items == edited.items && model.link_operator == edited.link_operator {
            return false;
        }
        model.items = edited.items.clone();
        model.link_operator = edited.link_operator;
        self.reset_page();
        true
    }

    fn reset_page(&mut self) {
        if let Some(pagination) = &mut self.state.pagination {
            pagination.page = 0;
        }
    }

    fn notify(&self) {
        let listeners = self
            .events
            .publish(&GridEvent::StateChange(Rc::new(self.state.clone())));
        debug!(listeners, "view state changed");
    }
}

fn opened(panel: PreferencePanel) -> PreferencePanelState {
    PreferencePanelState {
        open: true,
        opened_panel_value: Some(panel),
    }
}

impl fmt::Debug for DataGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataGrid")
            .field("name", &self.config.name)
            .field("rows", &self.rows.len())
            .field("state", &self.state)
            .field("quick_text", &self.quick_text)
            .field("persisted", &self.persistence.is_some())
            .finish_non_exhaustive()
    }
}
