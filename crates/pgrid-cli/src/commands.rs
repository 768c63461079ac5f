use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDateTime};
use comfy_table::Table;
use pgrid_export::ExcelOptions;
use pgrid_model::PaginationState;
use pgrid_state::{
    JsonFileStore, ManualClock, QueryParams, SharedStore, ViewStateStore, grid_name, storage_key,
};
use pgrid_view::{DataGrid, GridProps, QUICK_FILTER_DEBOUNCE, ToolbarOptions};
use tracing::{info, info_span};

use crate::cli::{ExportArgs, GridArgs, ShowArgs};
use crate::render::{key_value_table, page_table};
use crate::settings::Settings;
use crate::source::{load_config, load_rows, require_fields};

/// Result of `pgrid show`.
#[derive(Debug)]
pub struct ShowOutcome {
    pub table: Table,
    pub shown: usize,
    /// Rows passing every filter.
    pub matched: usize,
    /// Rows reported by the row source.
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    /// Whether view state was written on unmount.
    pub persisted: bool,
}

/// Result of `pgrid export`.
#[derive(Debug)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

pub fn run_show(args: &ShowArgs, settings: &Settings) -> Result<ShowOutcome> {
    let span = info_span!("show", config = %args.grid.config.display());
    let _guard = span.enter();

    let mut grid = mount_grid(&args.grid, settings, ToolbarOptions::default())?;
    let page = args.page.unwrap_or_default();
    grid.set_pagination(PaginationState {
        page,
        page_size: args.page_size,
    });
    let table = page_table(&grid);
    let shown = grid.page_rows().len();
    let matched = grid.visible_rows().len();
    let total = grid.total();
    let page_count = grid.page_count();
    let persisted = grid.unmount()?;
    info!(shown, matched, total, persisted, "grid shown");
    Ok(ShowOutcome {
        table,
        shown,
        matched,
        total,
        page,
        page_count,
        persisted,
    })
}

pub fn run_export(args: &ExportArgs, settings: &Settings) -> Result<ExportSummary> {
    run_export_at(args, settings, Local::now().naive_local())
}

/// `run_export` with a fixed timestamp for the file name.
pub fn run_export_at(
    args: &ExportArgs,
    settings: &Settings,
    now: NaiveDateTime,
) -> Result<ExportSummary> {
    let span = info_span!("export", config = %args.grid.config.display());
    let _guard = span.enter();

    let report_name = args
        .report_name
        .clone()
        .or_else(|| settings.report_name.clone());
    let mut excel_options = ExcelOptions::default();
    if let Some(name) = report_name {
        excel_options.report_name = name;
    }
    if let Some(sheet) = &settings.sheet_name {
        excel_options.sheet_name.clone_from(sheet);
    }
    let toolbar = ToolbarOptions {
        direct_export: Some(args.all_columns),
        excel_options,
        ..ToolbarOptions::default()
    };

    let mut grid = mount_grid(&args.grid, settings, toolbar)?;
    let request = grid
        .press_export(now)?
        .context("export control did not produce a request")?;
    let outcome = grid.export(&request)?;
    let dir = args.out.clone().unwrap_or_else(|| settings.export_dir());
    let path = outcome
        .write_to(&dir)
        .with_context(|| format!("write export to {}", dir.display()))?;
    grid.unmount()?;
    Ok(ExportSummary {
        path,
        rows: outcome.row_count,
        columns: outcome.column_count,
    })
}

pub fn run_state_list(store_dir: Option<&Path>, settings: &Settings) -> Result<Table> {
    let store = JsonFileStore::new(resolve_store_dir(store_dir, settings));
    let keys = store.keys().context("list persisted view state")?;
    let entries = keys
        .iter()
        .map(|key| {
            let path = store
                .path_for(key)
                .map(|path| path.display().to_string())
                .unwrap_or_default();
            (grid_name(key).unwrap_or(key.as_str()), path)
        })
        .collect::<Vec<_>>();
    Ok(key_value_table(["Grid", "File"], entries))
}

pub fn run_state_show(name: &str, store_dir: Option<&Path>, settings: &Settings) -> Result<String> {
    let store = JsonFileStore::new(resolve_store_dir(store_dir, settings));
    let Some(document) = store.read(&storage_key(name))? else {
        bail!("no saved view state for grid `{name}`");
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn run_state_clear(name: &str, store_dir: Option<&Path>, settings: &Settings) -> Result<bool> {
    let mut store = JsonFileStore::new(resolve_store_dir(store_dir, settings));
    let removed = store.remove(&storage_key(name))?;
    info!(grid = name, removed, "view state cleared");
    Ok(removed)
}

fn resolve_store_dir(explicit: Option<&Path>, settings: &Settings) -> PathBuf {
    explicit.map_or_else(|| settings.store_dir(), Path::to_path_buf)
}

/// Mount the grid and apply the view changes given on the command line.
fn mount_grid(args: &GridArgs, settings: &Settings, toolbar: ToolbarOptions) -> Result<DataGrid> {
    let config = load_config(&args.config)?;
    require_fields(
        &config,
        args.sort
            .iter()
            .map(|item| item.field.as_str())
            .chain(args.hide.iter().map(String::as_str)),
    )?;
    let page = load_rows(&args.rows, &config.columns)?;

    let store: SharedStore = Rc::new(RefCell::new(JsonFileStore::new(resolve_store_dir(
        args.store_dir.as_deref(),
        settings,
    ))));
    // The command applies the search at once instead of waiting on a timer.
    let clock = ManualClock::new();
    let props = GridProps {
        total: Some(page.total),
        ..GridProps::new(config, page.rows)
    }
    .with_query(QueryParams::parse(&args.query))
    .with_toolbar(toolbar);
    let mut grid = DataGrid::mount(props, store, Rc::new(clock.clone()))?;

    if !args.sort.is_empty() {
        grid.set_sort_model(args.sort.clone())?;
    }
    if !args.hide.is_empty() {
        let mut model = grid.state().columns.column_visibility_model.clone();
        for field in &args.hide {
            model.insert(field.clone(), false);
        }
        grid.set_column_visibility_model(model);
    }
    if let Some(text) = &args.quick {
        grid.type_quick_filter(text.as_str());
        clock.advance(QUICK_FILTER_DEBOUNCE);
        grid.tick();
    }
    Ok(grid)
}
