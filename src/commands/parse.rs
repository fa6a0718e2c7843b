//! Parse command handler

use anyhow::{bail, Context, Result};
use humansize::{format_size, DECIMAL};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use swmmscan::cancel::CancelToken;
use swmmscan::config::OutputFormat;
use swmmscan::ranking::{top_flooded, top_surcharged};
use swmmscan::report::{
    parse_path_with, FloodedNode, ParsedReport, ReportError, SurchargedConduit, Termination,
};
use swmmscan::sessions::SessionRecord;

use super::{file_label, load_config};

/// Options resolved from the command line.
pub struct ParseArgs<'a> {
    pub files: &'a [PathBuf],
    pub format: Option<OutputFormat>,
    pub top: Option<usize>,
    pub no_log: bool,
    pub config: Option<&'a Path>,
}

/// One report in JSON output.
#[derive(Serialize)]
struct FileOutput<'a> {
    file: String,
    report: &'a ParsedReport,
    top_flooded: Vec<&'a FloodedNode>,
    top_surcharged: Vec<&'a SurchargedConduit>,
}

/// Parse every file and print the results in argument order.
#[cfg(not(tarpaulin_include))]
pub fn handle(args: ParseArgs<'_>) -> Result<()> {
    let config = load_config(args.config)?;
    let grammar = config.grammar().context("Invalid grammar configuration")?;
    let format = args.format.unwrap_or(config.output.format);
    let top_n = args.top.unwrap_or(config.output.top_n);
    let session_log = if args.no_log {
        None
    } else {
        config.session_log()
    };

    let cancel = CancelToken::new();
    cancel.register_signal_handlers();

    let results: Vec<(&PathBuf, Result<ParsedReport, ReportError>)> = args
        .files
        .par_iter()
        .map(|path| (path, parse_path_with(path, &grammar, &cancel)))
        .collect();

    let mut parsed = Vec::new();
    let mut failed = 0usize;
    for (path, result) in results {
        match result {
            Ok(report) => parsed.push((file_label(path), report)),
            Err(e) => {
                eprintln!("Error: {}", e);
                failed += 1;
            }
        }
    }

    if let Some(log) = &session_log {
        for (file, report) in &parsed {
            if let Err(e) = log.append(&SessionRecord::new(file.as_str(), report)) {
                warn!(error = %e, "could not append to session log");
            } else {
                debug!(file = %file, path = ?log.path(), "session logged");
            }
        }
    }

    match format {
        OutputFormat::Text => {
            for (idx, (file, report)) in parsed.iter().enumerate() {
                if idx > 0 {
                    println!();
                }
                print!("{}", render_text(file, report, top_n));
            }
        }
        OutputFormat::Json => {
            let output: Vec<FileOutput<'_>> = parsed
                .iter()
                .map(|(file, report)| FileOutput {
                    file: file.clone(),
                    report,
                    top_flooded: top_flooded(report, top_n),
                    top_surcharged: top_surcharged(report, top_n),
                })
                .collect();
            let json = serde_json::to_string_pretty(&output).context("Failed to serialize output")?;
            println!("{}", json);
        }
    }

    if failed > 0 {
        bail!("{} of {} reports could not be opened", failed, args.files.len());
    }
    if cancel.is_cancelled() {
        bail!("Parsing was cancelled; results above are incomplete");
    }
    Ok(())
}

/// Human-readable summary of one report.
pub fn render_text(file: &str, report: &ParsedReport, top_n: usize) -> String {
    let mut out = String::new();
    let summary = &report.summary;

    let _ = writeln!(out, "{}", file);
    let _ = writeln!(
        out,
        "  Scanned {} lines ({}) in {:.2?}",
        report.lines_scanned,
        format_size(report.bytes_scanned, DECIMAL),
        report.elapsed
    );

    match &report.termination {
        Termination::EndOfInput => {}
        Termination::IoFailure { line, message } => {
            let _ = writeln!(out, "  INCOMPLETE: read failed at line {}: {}", line, message);
        }
        Termination::Cancelled => {
            let _ = writeln!(out, "  INCOMPLETE: cancelled");
        }
    }
    if report.is_unrecognized() {
        let _ = writeln!(out, "  No SWMM report sections found");
        return out;
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "  Continuity");
    if report.continuity_errors.is_empty() {
        let _ = writeln!(out, "    (none)");
    }
    for c in &report.continuity_errors {
        let _ = writeln!(out, "    {:<32} {:>9.3} %", c.category, c.error_pct);
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  Flooded nodes: {} (total volume {})",
        summary.flooded_node_count, summary.total_flooded_volume
    );
    for node in top_flooded(report, top_n) {
        let _ = writeln!(
            out,
            "    {:<16} {:>12.3} vol {:>8.2} h {:>10.3} peak",
            node.node_id, node.total_volume, node.hours_flooded, node.max_rate
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  Surcharged conduits: {}",
        summary.surcharged_conduit_count
    );
    for link in top_surcharged(report, top_n) {
        let _ = writeln!(
            out,
            "    {:<16} {:>8.2} h surcharged",
            link.link_id, link.hours_surcharged
        );
    }

    let anomalies = report.anomaly_count();
    if anomalies > 0 {
        let _ = writeln!(out);
        let _ = writeln!(out, "  {} rows could not be parsed", anomalies);
        for anomaly in report.diagnostics.anomalies.iter().take(top_n) {
            let _ = writeln!(out, "    line {}: {}", anomaly.line, anomaly.reason);
        }
    }
    out
}
