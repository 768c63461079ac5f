//! `pgrid` command.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::{ColorChoice, Parser};
use pgrid_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg, StateCommand};
use pgrid_cli::commands::{run_export, run_show, run_state_clear, run_state_list, run_state_show};
use pgrid_cli::logging::{LogConfig, LogFormat, init_logging};
use pgrid_cli::settings::load_settings;
use tracing::level_filters::LevelFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }
    let settings = load_settings(cli.settings.as_deref());

    let outcome = match &cli.command {
        Command::Show(args) => run_show(args, &settings).map(|outcome| {
            println!("{}", outcome.table);
            println!(
                "Page {} of {}: {} of {} matching rows ({} total)",
                outcome.page + 1,
                outcome.page_count,
                outcome.shown,
                outcome.matched,
                outcome.total
            );
        }),
        Command::Export(args) => run_export(args, &settings).map(|summary| {
            println!(
                "Exported {} rows x {} columns to {}",
                summary.rows,
                summary.columns,
                summary.path.display()
            );
        }),
        Command::State(StateCommand::List { store_dir }) => {
            run_state_list(store_dir.as_deref(), &settings).map(|table| println!("{table}"))
        }
        Command::State(StateCommand::Show { name, store_dir }) => {
            run_state_show(name, store_dir.as_deref(), &settings).map(|json| println!("{json}"))
        }
        Command::State(StateCommand::Clear { name, store_dir }) => {
            run_state_clear(name, store_dir.as_deref(), &settings).map(|removed| {
                if removed {
                    println!("Cleared view state for `{name}`");
                } else {
                    println!("No view state stored for `{name}`");
                }
            })
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

/// Flags win over `RUST_LOG`; `RUST_LOG` wins over the default level.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !(cli.verbosity.is_present() || cli.log_level.is_some()),
        ..LogConfig::default()
    };
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file.clone_from(&cli.log_file);
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
