//! Grid configuration and row files.
//!
//! Configurations are JSON or TOML [`GridConfig`] documents. Rows are either
//! a row-source response (a JSON array or a `{count, list}` envelope) or a
//! CSV file whose header names the fields.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};
use pgrid_model::{
    CellValue, ColumnDescriptor, ColumnType, GridConfig, Row, RowPage, RowsPayload, SortDirection,
    SortItem,
};
use tracing::debug;

pub fn load_config(path: &Path) -> Result<GridConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("read grid configuration {}", path.display()))?;
    let config: GridConfig = if has_extension(path, "toml") {
        toml::from_str(&content)
            .with_context(|| format!("parse grid configuration {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("parse grid configuration {}", path.display()))?
    };
    config
        .validate()
        .with_context(|| format!("invalid grid configuration {}", path.display()))?;
    Ok(config)
}

pub fn load_rows(path: &Path, columns: &[ColumnDescriptor]) -> Result<RowPage> {
    let file = File::open(path).with_context(|| format!("open rows {}", path.display()))?;
    let page = if has_extension(path, "csv") {
        let rows = read_csv_rows(file, columns)
            .with_context(|| format!("read rows {}", path.display()))?;
        RowPage {
            total: rows.len(),
            rows,
        }
    } else {
        let payload: RowsPayload = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parse rows {}", path.display()))?;
        payload.into_page()
    };
    debug!(path = %path.display(), rows = page.rows.len(), total = page.total, "rows loaded");
    Ok(page)
}

/// Read CSV records as rows. Empty cells are null; number columns are parsed.
pub fn read_csv_rows<R: Read>(reader: R, columns: &[ColumnDescriptor]) -> Result<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers().context("read CSV header")?.clone();
    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("read CSV record {}", index + 1))?;
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(field, raw)| (field, csv_cell(columns, field, raw)))
                .collect(),
        );
    }
    Ok(rows)
}

fn csv_cell(columns: &[ColumnDescriptor], field: &str, raw: &str) -> CellValue {
    if raw.is_empty() {
        return CellValue::Null;
    }
    let column_type = columns
        .iter()
        .find(|column| column.field == field)
        .map(|column| column.column_type);
    match (column_type, raw) {
        (Some(ColumnType::Number), _) => raw
            .parse::<f64>()
            .map_or_else(|_| CellValue::text(raw), CellValue::Number),
        (_, "true") => CellValue::Bool(true),
        (_, "false") => CellValue::Bool(false),
        _ => CellValue::text(raw),
    }
}

/// Parse `field` or `field:asc|desc`.
pub fn parse_sort_item(raw: &str) -> std::result::Result<SortItem, String> {
    let (field, direction) = raw.split_once(':').unwrap_or((raw, "asc"));
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("`{raw}` names no field"));
    }
    let sort = match direction.trim().to_ascii_lowercase().as_str() {
        "asc" => SortDirection::Asc,
        "desc" => SortDirection::Desc,
        other => return Err(format!("unknown sort direction `{other}`")),
    };
    Ok(SortItem {
        field: field.to_string(),
        sort,
    })
}

/// Fail on fields the configuration does not declare.
pub fn require_fields<'f>(
    config: &GridConfig,
    fields: impl IntoIterator<Item = &'f str>,
) -> Result<()> {
    for field in fields {
        if config.column(field).is_none() {
            bail!("grid `{}` has no column `{field}`", config.name.as_deref().unwrap_or_default());
        }
    }
    Ok(())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_specs() {
        assert_eq!(parse_sort_item("hired:desc").unwrap(), SortItem::desc("hired"));
        assert_eq!(parse_sort_item("name").unwrap(), SortItem::asc("name"));
        assert!(parse_sort_item(":desc").is_err());
        assert!(parse_sort_item("name:up").is_err());
    }

    #[test]
    fn csv_cells_follow_column_types() {
        let columns = vec![
            ColumnDescriptor::string("name"),
            ColumnDescriptor::number("salary"),
        ];
        let rows = read_csv_rows(
            "name,salary,active\nAda, 5200.5 ,true\nGrace,,false\n".as_bytes(),
            &columns,
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("salary"), Some(&CellValue::Number(5200.5)));
        assert_eq!(rows[0].get("active"), Some(&CellValue::Bool(true)));
        assert_eq!(rows[1].get("salary"), Some(&CellValue::Null));
    }
}
