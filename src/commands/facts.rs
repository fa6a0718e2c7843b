//! Facts command handler

use anyhow::{Context, Result};
use std::path::Path;

use swmmscan::cancel::CancelToken;
use swmmscan::facts::FactSheet;
use swmmscan::report::parse_path_with;

use super::{file_label, load_config};

/// Parse one report and print its fact sheet.
#[cfg(not(tarpaulin_include))]
pub fn handle(file: &Path, top: Option<usize>, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let grammar = config.grammar().context("Invalid grammar configuration")?;
    let top_n = top.unwrap_or(config.output.top_n);

    let cancel = CancelToken::new();
    cancel.register_signal_handlers();

    let report = parse_path_with(file, &grammar, &cancel)?;
    let title = file_label(file);
    print!("{}", FactSheet::new(&report).titled(&title).top_n(top_n));
    Ok(())
}
