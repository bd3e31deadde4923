use crate::correlator::StatsSnapshot;
use crate::output::RenderStyle;
use crate::parser::InputFormat;
use std::path::PathBuf;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Event log to replay
    pub input: PathBuf,

    /// Input format (None = detect from the first line)
    pub format: Option<InputFormat>,

    /// Line style for printed trees
    pub style: RenderStyle,

    /// Print each completed tree to stdout
    pub print_trees: bool,

    /// Output path for JSON report (optional)
    pub output_json: Option<PathBuf>,

    /// Print statistics summary to stdout
    pub print_summary: bool,

    /// Fail on the first malformed record instead of skipping it
    pub strict: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("trace.log"),
            format: None,
            style: RenderStyle::Minimal,
            print_trees: true,
            output_json: None,
            print_summary: false,
            strict: false,
        }
    }
}

/// What an analyze run produced
#[derive(Debug, Clone)]
pub struct AnalyzeSummary {
    /// Events read from the log
    pub events: usize,

    /// Correlator counters after the replay
    pub stats: StatsSnapshot,

    /// Trees that completed and were rendered
    pub completed: usize,

    /// Trees whose root never closed
    pub orphaned: usize,
}
