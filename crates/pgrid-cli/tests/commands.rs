//! Commands run against files in a temporary folder.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use clap::Parser;
use pgrid_cli::cli::{Cli, Command, ExportArgs, ShowArgs};
use pgrid_cli::commands::{run_export_at, run_show, run_state_clear, run_state_list, run_state_show};
use pgrid_cli::settings::Settings;
use pgrid_model::GridViewState;
use tempfile::TempDir;

const CONFIG: &str = r#"{
  "name": "emp_list",
  "saveGridState": true,
  "columns": [
    { "field": "name", "headerName": "Name", "hideable": false },
    { "field": "title", "headerName": "Title" },
    { "field": "salary", "headerName": "Salary", "type": "number" },
    { "field": "hired", "headerName": "Hired", "type": "date" }
  ]
}"#;

const ROWS: &str = "\
name,title,salary,hired
Ada Lovelace,Engineer,5200,2021-04-01
Grace Hopper,Admiral,6100,2019-09-15
Linus Torvalds,,4800,2023-01-10
";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("grid.json"), CONFIG).unwrap();
        fs::write(dir.path().join("rows.csv"), ROWS).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }

    fn store(&self) -> std::path::PathBuf {
        self.dir.path().join("state")
    }

    fn settings(&self) -> Settings {
        Settings {
            store_dir: Some(self.store()),
            export_dir: Some(self.dir.path().join("exports")),
            ..Settings::default()
        }
    }

    fn parse(&self, command: &str, extra: &[&str]) -> Command {
        let config = self.path("grid.json");
        let rows = self.path("rows.csv");
        let mut args = vec!["pgrid", command, "--config", &config, "--rows", &rows];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args).unwrap().command
    }

    fn show(&self, extra: &[&str]) -> ShowArgs {
        match self.parse("show", extra) {
            Command::Show(args) => args,
            _ => unreachable!(),
        }
    }

    fn export(&self, extra: &[&str]) -> ExportArgs {
        match self.parse("export", extra) {
            Command::Export(args) => args,
            _ => unreachable!(),
        }
    }
}

fn first_data_line(table: &str) -> String {
    table
        .lines()
        .find(|line| {
            line.contains("Lovelace") || line.contains("Hopper") || line.contains("Torvalds")
        })
        .unwrap_or_default()
        .to_string()
}

#[test]
fn sort_from_one_run_is_restored_in_the_next() {
    let workspace = Workspace::new();
    let settings = workspace.settings();

    let first = run_show(&workspace.show(&["--sort", "hired:desc"]), &settings).unwrap();
    assert!(first.persisted);
    assert_eq!(first.matched, 3);
    assert!(first_data_line(&first.table.to_string()).contains("Linus Torvalds"));

    let second = run_show(&workspace.show(&[]), &settings).unwrap();
    assert!(!second.persisted);
    assert!(first_data_line(&second.table.to_string()).contains("Linus Torvalds"));

    let stored = run_state_show("emp_list", None, &settings).unwrap();
    assert!(stored.contains("\"sort\": \"desc\""));
    assert!(!stored.contains("pagination"));
}

#[test]
fn stored_layout_keeps_sort_and_hidden_columns() {
    let workspace = Workspace::new();
    let settings = workspace.settings();
    run_show(
        &workspace.show(&["--sort", "hired:desc", "--hide", "title", "--page-size", "2"]),
        &settings,
    )
    .unwrap();

    let stored: GridViewState =
        serde_json::from_str(&run_state_show("emp_list", None, &settings).unwrap()).unwrap();
    insta::assert_json_snapshot!(stored, @r###"
    {
      "columns": {
        "columnVisibilityModel": {
          "title": false
        }
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
}

#[test]
fn query_string_keeps_the_store_untouched() {
    let workspace = Workspace::new();
    let settings = workspace.settings();
    let outcome = run_show(
        &workspace.show(&["--sort", "salary", "--query", "?department=7"]),
        &settings,
    )
    .unwrap();
    assert!(!outcome.persisted);
    assert!(run_state_show("emp_list", None, &settings).is_err());
}

#[test]
fn quick_filter_and_paging() {
    let workspace = Workspace::new();
    let outcome = run_show(
        &workspace.show(&["--quick", "er", "--sort", "name", "--page-size", "1", "--page", "1"]),
        &workspace.settings(),
    )
    .unwrap();
    assert_eq!(outcome.matched, 2);
    assert_eq!(outcome.page_count, 2);
    assert_eq!(outcome.shown, 1);
    assert!(outcome.table.to_string().contains("Grace Hopper"));
}

#[test]
fn unknown_fields_are_rejected_before_mounting() {
    let workspace = Workspace::new();
    let error = run_show(&workspace.show(&["--hide", "ssn"]), &workspace.settings()).unwrap_err();
    assert!(error.to_string().contains("ssn"));
}

#[test]
fn export_writes_a_named_workbook() {
    let workspace = Workspace::new();
    let at = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(16, 45, 0)
        .unwrap();
    let summary = run_export_at(
        &workspace.export(&["--hide", "salary", "--report-name", "Employee List"]),
        &workspace.settings(),
        at,
    )
    .unwrap();
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.columns, 3);
    assert_eq!(
        summary.path.file_name().and_then(|name| name.to_str()),
        Some("2024-03-01T16:45 - Profesto - Employee List.xlsx")
    );
    assert!(Path::new(&summary.path).exists());

    let summary = run_export_at(
        &workspace.export(&["--hide", "salary", "--all-columns"]),
        &workspace.settings(),
        at,
    )
    .unwrap();
    assert_eq!(summary.columns, 4);
}

#[test]
fn state_list_and_clear() {
    let workspace = Workspace::new();
    let settings = workspace.settings();
    run_show(&workspace.show(&["--hide", "title"]), &settings).unwrap();

    let listing = run_state_list(None, &settings).unwrap().to_string();
    assert!(listing.contains("emp_list"));

    assert!(run_state_clear("emp_list", None, &settings).unwrap());
    assert!(!run_state_clear("emp_list", None, &settings).unwrap());
    assert!(!run_state_list(Some(&workspace.store()), &settings)
        .unwrap()
        .to_string()
        .contains("emp_list"));
}
