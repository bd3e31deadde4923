//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Reads the event log
//! 2. Replays every event through a fresh correlator
//! 3. Reports trees that never completed
//! 4. Writes the JSON report and summary

use super::models::{AnalyzeArgs, AnalyzeSummary};
use crate::correlator::Correlator;
use crate::output::{write_report, Renderer, Report, ReportSink, TreeReport};
use crate::parser::read_events;
use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use std::time::Instant;

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Analyze command arguments
///
/// # Returns
/// Counts describing the run
///
/// # Errors
/// * Log file cannot be read or parsed (strict mode)
/// * Report file cannot be written
pub fn execute_analyze(args: AnalyzeArgs) -> Result<AnalyzeSummary> {
    let start_time = Instant::now();

    info!("Starting analysis of: {}", args.input.display());

    // Step 1: Read events
    info!("Step 1/3: Reading events...");
    let events = read_events(&args.input, args.format, !args.strict)
        .with_context(|| format!("Failed to read events from {}", args.input.display()))?;

    debug!("Read {} events", events.len());

    // Step 2: Replay through the correlator
    info!("Step 2/3: Correlating {} events...", events.len());
    let sink = if args.print_trees {
        ReportSink::new().with_echo(Renderer::new(args.style))
    } else {
        ReportSink::new()
    };
    let correlator = Correlator::new(sink);

    for event in &events {
        correlator.ingest(event);
    }

    // Step 3: Collect leftovers and write outputs
    info!("Step 3/3: Collecting results...");
    let orphaned: Vec<TreeReport> = correlator
        .drain_incomplete()
        .iter()
        .filter_map(|tree| {
            warn!(
                "Negotiation on thread {} never completed ({} queries, {} still open)",
                tree.thread(),
                tree.len(),
                tree.open_depth()
            );
            TreeReport::from_tree(tree)
        })
        .collect();

    let stats = correlator.stats().snapshot();
    let trees = correlator.into_sink().into_reports();

    let summary = AnalyzeSummary {
        events: events.len(),
        stats,
        completed: trees.len(),
        orphaned: orphaned.len(),
    };

    if let Some(path) = &args.output_json {
        let report = Report::new(
            Some(args.input.display().to_string()),
            stats,
            trees,
            orphaned,
        );
        write_report(&report, path).context("Failed to write report JSON")?;
        info!("✓ Report written to: {}", path.display());
    }

    if args.print_summary {
        println!("{}", "=".repeat(80));
        println!("NEGOTIATION SUMMARY");
        println!("{}", "=".repeat(80));
        println!("Input:          {}", args.input.display());
        println!("Events:         {}", summary.events);
        println!("Trees:          {}", summary.completed);
        println!("Incomplete:     {}", summary.orphaned);
        println!("Mismatches:     {}", stats.mismatches);
        println!("Ignored:        {}", stats.ignored);
        println!("Max depth:      {}", stats.max_depth);
        println!("{}", "=".repeat(80));
    }

    info!("Correlator: {}", stats.summary());
    info!("Analysis completed in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(summary)
}

/// Validate analyze arguments before running
///
/// **Public** - called by main.rs before execute_analyze
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if !args.input.exists() {
        bail!("Input file does not exist: {}", args.input.display());
    }

    if !args.input.is_file() {
        bail!("Input path is not a file: {}", args.input.display());
    }

    if let Some(json) = &args.output_json {
        if json == &args.input {
            bail!("Report path must differ from the input log");
        }
    }

    Ok(())
}
