//! swmmscan - CLI entry point

mod commands;

use anyhow::Result;
use clap::Parser;

use swmmscan::cli::{Cli, Commands, ConfigCommands};
use swmmscan::logging::{init_logging, LogConfig};

#[cfg(not(tarpaulin_include))]
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    // Config errors are reported by the command itself; logging falls back to defaults.
    let log_filter = commands::load_config(config_path)
        .map(|c| c.logging.filter)
        .unwrap_or_else(|_| swmmscan::logging::DEFAULT_LOG_FILTER.to_string());
    init_logging(LogConfig {
        filter: &log_filter,
        verbose: cli.verbose,
    })?;

    match &cli.command {
        Commands::Parse {
            files,
            format,
            top,
            no_log,
        } => commands::parse::handle(commands::parse::ParseArgs {
            files,
            format: *format,
            top: *top,
            no_log: *no_log,
            config: config_path,
        }),
        Commands::Facts { file, top } => commands::facts::handle(file, *top, config_path),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::handle_show(config_path),
            ConfigCommands::Path => commands::config::handle_path(config_path),
            ConfigCommands::Init { force } => commands::config::handle_init(config_path, *force),
        },
        Commands::Completions { shell } => commands::completions::handle::<Cli>(*shell),
    }
}
