use crate::output::read_report;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::Result;
use std::path::PathBuf;

/// Validate a report JSON file
pub fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(&file_path)?;

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    if let Some(input) = &report.input {
        println!("  Input: {}", input);
    }
    println!("  Trees: {}", report.trees.len());
    println!("  Incomplete: {}", report.orphaned.len());
    println!("  Mismatches: {}", report.stats.mismatches);
    println!("  Generated: {}", report.generated_at);

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Caps Nego Trace Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string          - Schema version (e.g., '1.0.0')");
        println!("  input: string?           - Event log the report was built from");
        println!("  stats: object            - Correlator counters");
        println!("    begins / ends: number  - Accepted begin and end events");
        println!("    ignored: number        - Events for untraced query types");
        println!("    mismatches: number     - Discarded end events");
        println!("    completed_trees: number");
        println!("    max_depth: number      - Deepest query nesting seen");
        println!("  trees: array             - Completed call trees");
        println!("    thread: number         - Thread identity");
        println!("    query_count: number    - Queries in the tree");
        println!("    root: node             - Top-level query");
        println!("  node: object");
        println!("    query: string          - 'caps' or 'accept-caps'");
        println!("    endpoint / peer: string");
        println!("    filter: string?        - Filter or proposed caps");
        println!("    start_ts / end_ts: number");
        println!("    success: bool?         - Query return value");
        println!("    result: string?        - Answered caps or accept verdict");
        println!("    children: array        - Nested queries in begin order");
        println!("  orphaned: array          - Trees whose root never closed");
        println!("  generated_at: string     - ISO 8601 timestamp");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Caps Nego Trace v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Call-tree reconstruction for caps negotiation traces.");
}
