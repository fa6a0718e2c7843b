//! CLI definitions for swmmscan
//!
//! This module contains the clap CLI structure definitions, separated from main.rs
//! so completions and tests can build the command tree from the library.

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use clap_complete::Shell as CompletionShell;
use std::path::PathBuf;

use crate::config::OutputFormat;

/// Build clap styles.
///
/// - Green: headers, usage, command names
/// - White: descriptions, placeholders
pub fn build_cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::White.on_default())
        .valid(AnsiColor::White.on_default())
        .invalid(AnsiColor::Red.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

#[derive(Parser)]
#[command(name = "swmmscan")]
#[command(about = "Extract flooding, surcharge and continuity results from SWMM reports")]
#[command(
    long_about = "swmmscan - Extract structured results from EPA SWMM text reports (.rpt).

Reads a report once, top to bottom, without loading it into memory, and
returns every continuity error, flooded node and surcharged conduit as typed
records. Rows that cannot be read are reported, never guessed.

QUICK START:
    swmmscan parse model.rpt               Summary and top-5 rankings
    swmmscan parse a.rpt b.rpt --format json
    swmmscan facts model.rpt               Plain-text fact sheet

CONFIGURATION:
    swmmscan config init                   Write ~/.config/swmmscan/config.toml
    swmmscan config show                   Print the effective configuration"
)]
#[command(version)]
#[command(styles = build_cli_styles())]
pub struct Cli {
    /// Config file to use instead of ~/.config/swmmscan/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse one or more reports
    #[command(long_about = "Parse SWMM reports and print their results.

Files are parsed in parallel, one session per file. Output keeps the order
of the arguments. Press Ctrl+C to stop; partial results are printed and
marked incomplete.

EXAMPLES:
    swmmscan parse model.rpt
    swmmscan parse model.rpt --top 10
    swmmscan parse runs/*.rpt --format json --no-log")]
    Parse {
        /// Report files to parse
        #[arg(required = true, value_name = "FILES")]
        files: Vec<PathBuf>,
        /// Output format (overrides config)
        #[arg(long, short, value_enum)]
        format: Option<OutputFormat>,
        /// Entries per ranking (overrides config)
        #[arg(long, value_name = "N")]
        top: Option<usize>,
        /// Do not append to the session log
        #[arg(long)]
        no_log: bool,
    },

    /// Print a deterministic fact sheet for one report
    #[command(long_about = "Print a plain-text fact sheet for one report.

Every number in the sheet comes straight from the parsed report. Rows that
could not be parsed, truncated reads and unrecognized files are always
stated.

EXAMPLE:
    swmmscan facts model.rpt")]
    Facts {
        /// Report file
        file: PathBuf,
        /// Entries per ranking (overrides config)
        #[arg(long, value_name = "N")]
        top: Option<usize>,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    #[command(long_about = "Generate a shell completion script on stdout.

EXAMPLE:
    swmmscan completions zsh > ~/.zfunc/_swmmscan")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration as TOML
    Show,
    /// Print the config file path
    Path,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
