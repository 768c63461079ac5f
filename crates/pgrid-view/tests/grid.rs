//! Grid lifecycle end to end: mount, edit, unmount, remount.

use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;

use calamine::{Reader, Xlsx, open_workbook_from_rs};
use chrono::{NaiveDate, NaiveDateTime};
use pgrid_export::{ExcelOptions, ExportChoice, ExportRequest};
use pgrid_model::{
    CellValue, ColumnDescriptor, FilterOperator, GridConfig, GridViewState, PaginationState, Row,
    SortItem,
};
use pgrid_state::{ManualClock, MemoryStore, Observers, QueryParams, SharedStore, ViewStateStore};
use pgrid_view::{
    Capabilities, CellRender, CustomFilter, DataGrid, DateRangeFilter, GridExtensions, GridProps,
    MonospaceMeasure, QUICK_FILTER_DEBOUNCE, ToolbarItem, ToolbarOptions, ViewError,
};
use proptest::prelude::*;

fn columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::string("name").with_header("Name").not_hideable(),
        ColumnDescriptor::string("title").with_header("Title"),
        ColumnDescriptor::number("salary").with_header("Salary"),
        ColumnDescriptor::date("hired").with_header("Hired"),
        ColumnDescriptor::single_select("status", ["Active", "Leave"]).with_header("Status"),
        ColumnDescriptor::actions("actions"),
    ]
}

fn rows() -> Vec<Row> {
    vec![
        Row::new()
            .with("name", "Ada Lovelace")
            .with("title", "Engineer")
            .with("salary", 5200.0)
            .with("hired", "2021-04-01")
            .with("status", "Active"),
        Row::new()
            .with("name", "Grace Hopper")
            .with("title", "Admiral")
            .with("salary", 6100.0)
            .with("hired", "2019-09-15")
            .with("status", "Leave"),
        Row::new()
            .with("name", "Linus Torvalds")
            .with("title", CellValue::Null)
            .with("salary", 4800.0)
            .with("hired", "2023-01-10")
            .with("status", "Active"),
    ]
}

fn config() -> GridConfig {
    GridConfig::new("emp_list", columns())
        .unwrap()
        .with_save_grid_state(true)
}

fn at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(9, 5, 0)
        .unwrap()
}

struct Harness {
    memory: Rc<RefCell<MemoryStore>>,
    clock: ManualClock,
}

impl Harness {
    fn new() -> Self {
        Self {
            memory: Rc::new(RefCell::new(MemoryStore::new())),
            clock: ManualClock::new(),
        }
    }

    fn mount(&self, props: GridProps) -> DataGrid {
        let store: SharedStore = self.memory.clone();
        DataGrid::mount(props, store, Rc::new(self.clock.clone())).unwrap()
    }

    fn mount_default(&self) -> DataGrid {
        self.mount(GridProps::new(config(), rows()))
    }

    fn search(&self, grid: &mut DataGrid, text: &str) {
        grid.type_quick_filter(text);
        self.clock.advance(QUICK_FILTER_DEBOUNCE);
        grid.tick();
    }

    fn stored(&self) -> Option<String> {
        self.memory
            .borrow()
            .raw("gridState-emp_list")
            .map(str::to_string)
    }
}

fn names(rows: &[&Row]) -> Vec<String> {
    rows.iter()
        .map(|row| row.get("name").map(ToString::to_string).unwrap_or_default())
        .collect()
}

#[test]
fn sort_survives_remount_without_pagination() {
    let harness = Harness::new();
    let mut grid = harness.mount_default();
    grid.set_sort_model(vec![SortItem::desc("hired")]).unwrap();
    grid.set_pagination(PaginationState {
        page: 0,
        page_size: 25,
    });
    assert!(harness.stored().is_none());
    assert!(grid.unmount().unwrap());

    let raw = harness.stored().unwrap();
    assert!(!raw.contains("pagination"));
    let stored: GridViewState = serde_json::from_str(&raw).unwrap();
    insta::assert_json_snapshot!(stored, @r###"
    {
      "columns": {
        "columnVisibilityModel": {}
      },
      "filter": {
        "filterModel": {
          "items": [],
          "linkOperator": "and"
        }
      },
      "sorting": {
        "sortModel": [
          {
            "field": "hired",
            "sort": "desc"
          }
        ]
      },
      "pinnedColumns": {}
    }
    "###);

    let grid = harness.mount_default();
    assert_eq!(grid.state().sort_model(), [SortItem::desc("hired")]);
    assert!(grid.state().pagination.is_none());
    assert_eq!(
        names(&grid.visible_rows()),
        ["Linus Torvalds", "Ada Lovelace", "Grace Hopper"]
    );
}

#[test]
fn untouched_grid_writes_nothing() {
    let harness = Harness::new();
    let grid = harness.mount_default();
    assert!(!grid.unmount().unwrap());
    assert_eq!(harness.memory.borrow().write_count(), 0);

    let mut grid = harness.mount_default();
    grid.set_sort_model(vec![SortItem::asc("salary")]).unwrap();
    grid.unmount().unwrap();

    let mut grid = harness.mount_default();
    grid.set_sort_model(vec![SortItem::asc("salary")]).unwrap();
    grid.set_pagination(PaginationState::default());
    assert!(!grid.unmount().unwrap());
    assert_eq!(harness.memory.borrow().write_count(), 1);
}

#[test]
fn quick_filter_is_saved_but_starts_empty_after_remount() {
    let harness = Harness::new();
    let mut grid = harness.mount_default();
    harness.search(&mut grid, "engineer");
    assert_eq!(names(&grid.visible_rows()), ["Ada Lovelace"]);
    grid.unmount().unwrap();

    assert!(harness.stored().unwrap().contains("quickFilterValues"));
    let grid = harness.mount_default();
    assert_eq!(grid.quick_text(), "");
    assert!(grid.state().filter.filter_model.quick_filter_values.is_none());
    assert_eq!(grid.visible_rows().len(), 3);
}

#[test]
fn query_string_turns_persistence_off() {
    let harness = Harness::new();
    let props = GridProps::new(config(), rows()).with_query(QueryParams::parse("?status=active"));
    let mut grid = harness.mount(props);
    assert!(!grid.is_persisted());
    grid.set_sort_model(vec![SortItem::asc("name")]).unwrap();
    assert!(!grid.unmount().unwrap());
    assert!(harness.stored().is_none());

    let props = GridProps::new(config().discarding_query_string_restrict(), rows())
        .with_query(QueryParams::parse("?status=active"));
    let mut grid = harness.mount(props);
    assert!(grid.is_persisted());
    grid.set_sort_model(vec![SortItem::asc("name")]).unwrap();
    assert!(grid.unmount().unwrap());
}

#[test]
fn damaged_state_falls_back_to_initial_state() {
    let harness = Harness::new();
    harness
        .memory
        .borrow_mut()
        .write("gridState-emp_list", &serde_json::json!({ "sorting": 5 }))
        .unwrap();
    let initial = GridViewState {
        sorting: pgrid_model::SortingState {
            sort_model: vec![SortItem::asc("salary")],
        },
        ..GridViewState::default()
    };
    let mut grid = harness.mount(GridProps::new(config().with_initial_state(initial), rows()));
    assert_eq!(grid.state().sort_model(), [SortItem::asc("salary")]);

    grid.set_sort_model(vec![SortItem::desc("salary")]).unwrap();
    assert!(grid.unmount().unwrap());
    let stored: GridViewState = serde_json::from_str(&harness.stored().unwrap()).unwrap();
    assert_eq!(stored.sort_model(), [SortItem::desc("salary")]);
}

#[test]
fn is_empty_filter_from_the_panel() {
    let harness = Harness::new();
    let mut grid = harness.mount_default();
    grid.open_filter_panel().unwrap();
    let id = grid.filter_panel().model().items[0].id;
    grid.edit_filters(|panel, columns| panel.change_column(id, "title", columns))
        .unwrap();
    grid.edit_filters(|panel, columns| {
        panel.change_operator(id, FilterOperator::IsEmpty, columns)
    })
    .unwrap();

    assert_eq!(names(&grid.visible_rows()), ["Linus Torvalds"]);
    let button = grid.toolbar().filter_button().unwrap();
    assert_eq!(button.active_count, 1);
    assert!(button.show_clear);

    grid.edit_filters(|panel, _| panel.delete_filter(id)).unwrap();
    assert!(!grid.filter_panel().is_open());
    assert_eq!(grid.visible_rows().len(), 3);
}

#[test]
fn toolbar_filters_narrow_rows_without_touching_view_state() {
    let harness = Harness::new();
    let props = GridProps::new(config(), rows())
        .with_date_range(DateRangeFilter::new("hired"))
        .with_custom_filter(CustomFilter::new(
            "status",
            "Status",
            "status",
            ["Active", "Leave"],
        ));
    let mut grid = harness.mount(props);
    grid.set_date_range(NaiveDate::from_ymd_opt(2020, 1, 1), None)
        .unwrap();
    assert_eq!(grid.visible_rows().len(), 2);
    grid.select_custom_filter("status", Some("Active")).unwrap();
    grid.set_sort_model(vec![SortItem::asc("salary")]).unwrap();
    assert_eq!(
        names(&grid.visible_rows()),
        ["Linus Torvalds", "Ada Lovelace"]
    );
    assert!(matches!(
        grid.select_custom_filter("region", None),
        Err(ViewError::UnknownCustomFilter(_))
    ));

    let toolbar = grid.toolbar();
    assert!(matches!(toolbar.left[0], ToolbarItem::DateRange { .. }));
    assert!(matches!(
        &toolbar.left[1],
        ToolbarItem::CustomFilter { selected: Some(value), .. } if value == "Active"
    ));
    assert!(matches!(toolbar.left[2], ToolbarItem::QuickFilter { .. }));

    grid.unmount().unwrap();
    assert!(!harness.stored().unwrap().contains("Active"));
}

#[test]
fn export_menu_writes_the_filtered_visible_columns() {
    let harness = Harness::new();
    let extensions = GridExtensions::builder()
        .cell_formatter("salary", |value: &CellValue| format!("{value} EUR"))
        .build(&columns())
        .unwrap();
    let props = GridProps::new(config(), rows())
        .with_extensions(extensions)
        .with_toolbar(ToolbarOptions {
            excel_options: ExcelOptions::named("Employee List"),
            ..ToolbarOptions::default()
        });
    let mut grid = harness.mount(props);
    grid.toggle_column("hired").unwrap();
    grid.toggle_column("status").unwrap();
    harness.search(&mut grid, "a");
    grid.set_sort_model(vec![SortItem::asc("name")]).unwrap();

    assert_eq!(grid.press_export(at()).unwrap(), None);
    let request = grid
        .choose_export(ExportChoice::VisibleColumns, at())
        .unwrap();
    let outcome = grid.export(&request).unwrap();
    assert_eq!(
        outcome.file_name,
        "2024-03-01T09:05 - Profesto - Employee List.xlsx"
    );
    assert_eq!(outcome.column_count, 3);

    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(outcome.bytes)).unwrap();
    let range = workbook.worksheet_range("Sheet1").unwrap();
    let cell = |row: u32, col: u32| {
        range
            .get_value((row, col))
            .map(ToString::to_string)
            .unwrap_or_default()
    };
    assert_eq!(cell(0, 0), "Name");
    assert_eq!(cell(0, 1), "Title");
    assert_eq!(cell(0, 2), "Salary");
    assert_eq!(cell(1, 0), "Ada Lovelace");
    assert_eq!(cell(1, 2), "5200 EUR");
    assert_eq!(outcome.row_count, grid.visible_rows().len());
}

#[test]
fn exports_follow_capabilities() {
    let harness = Harness::new();
    let props = GridProps::new(config(), rows()).with_capabilities(Capabilities {
        can_add: true,
        can_export: false,
    });
    let mut grid = harness.mount(props);
    assert!(grid.export_control().is_none());
    assert!(matches!(
        grid.press_export(at()),
        Err(ViewError::ExportsDisabled)
    ));
    let request = ExportRequest::new(ExcelOptions::default(), true, at());
    assert!(matches!(
        grid.export(&request),
        Err(ViewError::ExportsDisabled)
    ));

    let props = GridProps::new(config(), rows()).with_toolbar(ToolbarOptions {
        direct_export: Some(true),
        ..ToolbarOptions::default()
    });
    let mut grid = harness.mount(props);
    let request = grid.press_export(at()).unwrap().unwrap();
    assert!(request.all_columns);
    assert_eq!(grid.export(&request).unwrap().column_count, 5);
}

#[test]
fn overflowing_cell_expands_on_hover() {
    let harness = Harness::new();
    let grid = harness.mount(GridProps::new(
        GridConfig::new(
            "emp_list",
            vec![ColumnDescriptor::string("name").with_width(60.0)],
        )
        .unwrap(),
        rows(),
    ));
    let keys = Observers::new();
    let row = &grid.rows()[0];
    let mut cell = grid.cell(row, "name").unwrap();
    assert!(cell.pointer_enter(&MonospaceMeasure::default(), &keys));
    assert!(matches!(cell.render(), CellRender::Tooltip { title, .. } if title == "Ada Lovelace"));
    cell.pointer_leave();
    assert!(keys.is_empty());
    assert!(grid.cell(row, "missing").is_none());
}

proptest! {
    #[test]
    fn clear_all_hides_exactly_the_hideable_columns(
        hideable in proptest::collection::vec(any::<bool>(), 1..8),
    ) {
        let columns: Vec<ColumnDescriptor> = hideable
            .iter()
            .enumerate()
            .map(|(index, hideable)| {
                let column = ColumnDescriptor::string(format!("c{index}"));
                if *hideable { column } else { column.not_hideable() }
            })
            .collect();
        let harness = Harness::new();
        let mut grid = harness.mount(GridProps::new(
            GridConfig::new("props", columns.clone()).unwrap(),
            Vec::new(),
        ));
        grid.hide_all_columns();

        let visible: Vec<&str> = grid
            .visible_columns()
            .iter()
            .map(|column| column.field.as_str())
            .collect();
        let locked: Vec<&str> = columns
            .iter()
            .filter(|column| !column.hideable)
            .map(|column| column.field.as_str())
            .collect();
        prop_assert_eq!(visible, locked);
        for entry in grid.column_entries() {
            prop_assert_eq!(entry.checked, entry.disabled);
        }

        grid.show_all_columns();
        prop_assert_eq!(grid.visible_columns().len(), columns.len());
    }
}
