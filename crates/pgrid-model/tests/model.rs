//! Tests for pgrid-model types loaded from external formats.

use pgrid_model::{
    ColumnType, FilterOperator, FilterValue, GridConfig, GridViewState, LinkOperator,
    SortDirection,
};

#[test]
fn grid_config_loads_from_toml() {
    let config: GridConfig = toml::from_str(
        r#"
name = "emp_list"
saveGridState = true

[[columns]]
field = "name"
headerName = "Name"
hideable = false

[[columns]]
field = "hired"
type = "date"
showTime = true

[[columns]]
field = "status"
type = "singleSelect"
valueOptions = ["Active", "Terminated"]
filterOperators = ["is", "not"]
"#,
    )
    .expect("parse grid config");
    config.validate().expect("valid config");

    assert_eq!(config.storage_name(), Some("emp_list"));
    assert!(config.save_grid_state);
    assert!(!config.discard_query_string_save_restrict);

    let name = config.column("name").unwrap();
    assert_eq!(name.column_type, ColumnType::String);
    assert!(!name.hideable);
    assert_eq!(name.header(), "Name");

    let hired = config.column("hired").unwrap();
    assert_eq!(hired.column_type, ColumnType::Date);
    assert!(hired.show_time);

    let status = config.column("status").unwrap();
    assert_eq!(status.value_options, vec!["Active", "Terminated"]);
    assert_eq!(
        status.filter_operators,
        Some(vec![FilterOperator::Is, FilterOperator::Not])
    );
}

#[test]
fn view_state_reads_persisted_layout() {
    let state: GridViewState = serde_json::from_str(
        r#"{
            "columns": {"columnVisibilityModel": {"salary": false}},
            "filter": {"filterModel": {
                "items": [
                    {"id": 1, "columnField": "name", "operatorValue": "contains", "value": "ann"},
                    {"id": 2, "columnField": "dept", "operatorValue": "isAnyOf", "value": ["HR", "IT"]}
                ],
                "linkOperator": "or",
                "quickFilterValues": ["smith"]
            }},
            "sorting": {"sortModel": [{"field": "hired", "sort": "desc"}]},
            "pinnedColumns": {"left": ["name"]},
            "pagination": {"page": 2, "pageSize": 25}
        }"#,
    )
    .expect("parse view state");

    assert!(!state.is_column_visible("salary"));
    let model = state.filter_model();
    assert_eq!(model.link_operator, LinkOperator::Or);
    assert_eq!(model.items[0].value, Some(FilterValue::text("ann")));
    assert_eq!(
        model.items[1].value,
        Some(FilterValue::Many(vec!["HR".into(), "IT".into()]))
    );
    assert_eq!(model.quick_tokens(), vec!["smith"]);
    assert_eq!(state.sort_model()[0].sort, SortDirection::Desc);
    assert!(state.pinned_columns.is_pinned("name"));
    assert_eq!(state.pagination.unwrap().page_size, 25);
    assert!(state.preference_panel.is_none());
}
