//! Terminal tables.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use pgrid_model::{Align, ColumnType};
use pgrid_view::DataGrid;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

/// The current page of `grid`, visible columns only.
pub fn page_table(grid: &DataGrid) -> Table {
    let columns: Vec<_> = grid
        .visible_columns()
        .into_iter()
        .filter(|column| column.column_type != ColumnType::Actions)
        .collect();
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(columns.iter().map(|column| header_cell(column.header())));
    for row in grid.page_rows() {
        table.add_row(columns.iter().map(|column| {
            let cell = Cell::new(column.formatted(row));
            match column.align {
                Align::Left => cell,
                Align::Center => cell.set_alignment(CellAlignment::Center),
                Align::Right => cell.set_alignment(CellAlignment::Right),
            }
        }));
    }
    table
}

/// Two-column listing used by `state list`.
pub fn key_value_table<'a>(
    headers: [&str; 2],
    rows: impl IntoIterator<Item = (&'a str, String)>,
) -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(headers.map(header_cell));
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    table
}
