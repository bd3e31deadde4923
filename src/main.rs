//! Caps Nego Trace CLI
//!
//! Replays recorded caps negotiation events and prints one call tree
//! per top-level negotiation.

use anyhow::Result;
use caps_nego_trace::commands::{
    display_schema, display_version, execute_analyze, validate_args, validate_report_file,
    AnalyzeArgs,
};
use caps_nego_trace::output::RenderStyle;
use caps_nego_trace::parser::InputFormat;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

/// Caps Nego Trace - call trees for caps negotiation
#[derive(Parser, Debug)]
#[command(name = "caps-nego-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay an event log and print the negotiation trees
    Analyze {
        /// Event log (JSON lines or GStreamer tracer log)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format: jsonl or gst (detected when omitted)
        #[arg(short, long, value_parser = clap::value_parser!(InputFormat))]
        format: Option<InputFormat>,

        /// Print timestamps, filters and outcomes on each line
        #[arg(long)]
        detailed: bool,

        /// Do not print the trees
        #[arg(short, long)]
        quiet: bool,

        /// Output path for JSON report (optional)
        #[arg(long)]
        json: Option<PathBuf>,

        /// Print statistics summary to stdout
        #[arg(long)]
        summary: bool,

        /// Fail on malformed records instead of skipping them
        #[arg(long)]
        strict: bool,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Analyze {
            input,
            format,
            detailed,
            quiet,
            json,
            summary,
            strict,
        } => {
            let args = AnalyzeArgs {
                input,
                format,
                style: if detailed {
                    RenderStyle::Detailed
                } else {
                    RenderStyle::Minimal
                },
                print_trees: !quiet,
                output_json: json,
                print_summary: summary,
                strict,
            };

            validate_args(&args)?;
            execute_analyze(args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze_format(args: &[&str]) -> Option<InputFormat> {
        match Cli::try_parse_from(args).unwrap().command {
            Commands::Analyze { format, .. } => format,
            other => panic!("expected analyze, got {:?}", other),
        }
    }

    #[test]
    fn test_format_flag_parsed_by_clap() {
        let base = ["caps-nego-trace", "analyze", "--input", "trace.log"];
        assert_eq!(analyze_format(&base), None);
        assert_eq!(
            analyze_format(&[&base[..], &["--format", "gst"][..]].concat()),
            Some(InputFormat::GstLog)
        );
        assert_eq!(
            analyze_format(&[&base[..], &["-f", "jsonl"][..]].concat()),
            Some(InputFormat::JsonLines)
        );
    }

    #[test]
    fn test_unknown_format_is_usage_error() {
        let err = Cli::try_parse_from([
            "caps-nego-trace",
            "analyze",
            "--input",
            "trace.log",
            "--format",
            "csv",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
