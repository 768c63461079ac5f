//! Sort-model application.

use std::cmp::Ordering;

use pgrid_model::{CellValue, ColumnDescriptor, ColumnType, Row, SortDirection, SortItem};

/// Compare two cell values of a column in ascending order. Nulls sort first.
pub fn compare_cells(column_type: ColumnType, left: &CellValue, right: &CellValue) -> Ordering {
    match (left.is_null(), right.is_null()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }
    match column_type {
        ColumnType::Number => match (left.as_f64(), right.as_f64()) {
            (Some(l), Some(r)) => l.total_cmp(&r),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => compare_text(left, right),
        },
        ColumnType::Date => match (left.as_datetime(), right.as_datetime()) {
            (Some(l), Some(r)) => l.cmp(&r),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => compare_text(left, right),
        },
        _ => compare_text(left, right),
    }
}

fn compare_text(left: &CellValue, right: &CellValue) -> Ordering {
    left.to_string()
        .to_lowercase()
        .cmp(&right.to_string().to_lowercase())
}

/// Stable multi-key sort. Unknown or unsortable fields in the model are skipped.
pub fn sort_rows(columns: &[ColumnDescriptor], sort_model: &[SortItem], rows: &mut [&Row]) {
    let keys: Vec<(&ColumnDescriptor, SortDirection)> = sort_model
        .iter()
        .filter_map(|item| {
            columns
                .iter()
                .find(|column| column.field == item.field && column.is_sortable())
                .map(|column| (column, item.sort))
        })
        .collect();
    if keys.is_empty() {
        return;
    }
    rows.sort_by(|left, right| {
        for (column, direction) in &keys {
            let ordering =
                compare_cells(column.column_type, &column.value(left), &column.value(right));
            let ordering = match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(rows: &[&Row]) -> Vec<String> {
        rows.iter().map(|row| row.id().unwrap_or_default()).collect()
    }

    #[test]
    fn sorts_dates_descending() {
        let columns = vec![ColumnDescriptor::date("hired")];
        let data = vec![
            Row::new().with("id", "a").with("hired", "2021-05-01"),
            Row::new().with("id", "b").with("hired", "2023-01-15"),
            Row::new().with("id", "c").with("hired", CellValue::Null),
        ];
        let mut rows: Vec<&Row> = data.iter().collect();
        sort_rows(&columns, &[SortItem::desc("hired")], &mut rows);
        assert_eq!(fields(&rows), vec!["b", "a", "c"]);
    }

    #[test]
    fn numbers_sort_numerically_and_ties_fall_through() {
        let columns = vec![
            ColumnDescriptor::number("grade"),
            ColumnDescriptor::string("name"),
        ];
        let data = vec![
            Row::new().with("id", "1").with("grade", 10.0).with("name", "zed"),
            Row::new().with("id", "2").with("grade", 9.0).with("name", "amy"),
            Row::new().with("id", "3").with("grade", 10.0).with("name", "Bob"),
        ];
        let mut rows: Vec<&Row> = data.iter().collect();
        sort_rows(
            &columns,
            &[SortItem::asc("grade"), SortItem::asc("name")],
            &mut rows,
        );
        assert_eq!(fields(&rows), vec!["2", "3", "1"]);
    }

    #[test]
    fn unknown_sort_fields_leave_order_untouched() {
        let columns = vec![ColumnDescriptor::string("name")];
        let data = vec![
            Row::new().with("id", "x").with("name", "b"),
            Row::new().with("id", "y").with("name", "a"),
        ];
        let mut rows: Vec<&Row> = data.iter().collect();
        sort_rows(&columns, &[SortItem::asc("missing")], &mut rows);
        assert_eq!(fields(&rows), vec!["x", "y"]);
    }
}
