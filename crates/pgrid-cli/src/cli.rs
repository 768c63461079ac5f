//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use pgrid_model::SortItem;

use crate::source::parse_sort_item;

#[derive(Parser)]
#[command(
    name = "pgrid",
    version,
    about = "Render, filter and export Profesto data grids",
    long_about = "Render, filter and export Profesto data grids.\n\n\
                  Grids are described by a JSON or TOML configuration and fed from a\n\
                  JSON row-source response or a CSV file. View state (sorting, filters,\n\
                  column visibility) is persisted per grid name between runs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Settings file (default: pgrid.toml in the platform config folder).
    #[arg(long = "settings", value_name = "PATH", global = true)]
    pub settings: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the current page of a grid as a table.
    Show(ShowArgs),

    /// Write the filtered rows of a grid to an Excel workbook.
    Export(ExportArgs),

    /// Inspect or remove persisted view state.
    #[command(subcommand)]
    State(StateCommand),
}

/// Inputs and view-state changes shared by `show` and `export`.
#[derive(Args, Debug, Clone)]
pub struct GridArgs {
    /// Grid configuration (JSON or TOML).
    #[arg(long = "config", value_name = "PATH")]
    pub config: PathBuf,

    /// Rows: a JSON array, a `{count, list}` envelope, or a CSV file.
    #[arg(long = "rows", value_name = "PATH")]
    pub rows: PathBuf,

    /// Page query string; any parameter disables view-state persistence.
    #[arg(long = "query", value_name = "QUERY", default_value = "")]
    pub query: String,

    /// Quick-filter search text.
    #[arg(long = "quick", value_name = "TEXT")]
    pub quick: Option<String>,

    /// Sort by `field` or `field:desc`; repeat for secondary keys.
    #[arg(long = "sort", value_name = "FIELD[:DIR]", value_parser = parse_sort_item)]
    pub sort: Vec<SortItem>,

    /// Hide a column; repeatable.
    #[arg(long = "hide", value_name = "FIELD")]
    pub hide: Vec<String>,

    /// Override the view-state folder from settings.
    #[arg(long = "store-dir", value_name = "DIR")]
    pub store_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    /// Zero-based page to print.
    #[arg(long = "page", value_name = "N")]
    pub page: Option<usize>,

    /// Rows per page.
    #[arg(long = "page-size", value_name = "N", default_value_t = pgrid_model::DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    /// Export every column instead of the visible ones.
    #[arg(long = "all-columns")]
    pub all_columns: bool,

    /// Output folder (default: export-dir from settings, else the current folder).
    #[arg(long = "out", value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Report name used in the file name.
    #[arg(long = "report-name", value_name = "NAME")]
    pub report_name: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum StateCommand {
    /// List grids with persisted view state.
    List {
        #[arg(long = "store-dir", value_name = "DIR")]
        store_dir: Option<PathBuf>,
    },

    /// Print a grid's persisted view state.
    Show {
        name: String,
        #[arg(long = "store-dir", value_name = "DIR")]
        store_dir: Option<PathBuf>,
    },

    /// Remove a grid's persisted view state.
    Clear {
        name: String,
        #[arg(long = "store-dir", value_name = "DIR")]
        store_dir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_are_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn repeated_sort_keys() {
        let cli = Cli::try_parse_from([
            "pgrid", "show", "--config", "grid.json", "--rows", "rows.csv", "--sort",
            "hired:desc", "--sort", "name",
        ])
        .unwrap();
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(
            args.grid.sort,
            vec![SortItem::desc("hired"), SortItem::asc("name")]
        );
        assert_eq!(args.page_size, pgrid_model::DEFAULT_PAGE_SIZE);
    }
}
