//! Input format selection and file reading.

use super::gst_log::parse_gst_log;
use super::json_lines::parse_json_lines;
use super::schema::TraceEvent;
use crate::utils::error::ParseError;
use log::{debug, info};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported event log formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// One JSON `TraceEvent` per line
    JsonLines,
    /// GStreamer debug log with tracer query records
    GstLog,
}

impl InputFormat {
    /// Guess the format from the first non-empty line of a log
    ///
    /// GStreamer logs usually open with non-tracer lines, so anything
    /// that is not a JSON object is treated as a debug log.
    pub fn detect(first_line: &str) -> Self {
        if first_line.trim_start().starts_with('{') {
            InputFormat::JsonLines
        } else {
            InputFormat::GstLog
        }
    }
}

impl FromStr for InputFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jsonl" | "json" | "json-lines" => Ok(InputFormat::JsonLines),
            "gst" | "gst-log" => Ok(InputFormat::GstLog),
            other => Err(ParseError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::JsonLines => f.write_str("jsonl"),
            InputFormat::GstLog => f.write_str("gst"),
        }
    }
}

/// Parse log text in the given (or detected) format
///
/// **Public** - used by the analyze command and tests
pub fn parse_events(
    text: &str,
    format: Option<InputFormat>,
    lenient: bool,
) -> Result<Vec<TraceEvent>, ParseError> {
    let format = format.unwrap_or_else(|| {
        let detected = InputFormat::detect(first_record_line(text));
        debug!("Detected input format: {}", detected);
        detected
    });

    match format {
        InputFormat::JsonLines => parse_json_lines(text, lenient),
        InputFormat::GstLog => parse_gst_log(text, lenient),
    }
}

/// First line that is neither blank nor a `#` comment
fn first_record_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))
        .unwrap_or("")
}

/// Read and parse an event log file
///
/// **Public** - main entry point for file input
///
/// # Arguments
/// * `path` - Log file to read
/// * `format` - Input format, detected from the first line when `None`
/// * `lenient` - Skip malformed records instead of failing
///
/// # Errors
/// * `ParseError::IoError` - File cannot be read
/// * `ParseError::JsonError` / `ParseError::InvalidFormat` - Malformed record
pub fn read_events(
    path: impl AsRef<Path>,
    format: Option<InputFormat>,
    lenient: bool,
) -> Result<Vec<TraceEvent>, ParseError> {
    let path = path.as_ref();
    info!("Reading events from: {}", path.display());

    let text = std::fs::read_to_string(path)?;
    parse_events(&text, format, lenient)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSONL".parse::<InputFormat>().unwrap(), InputFormat::JsonLines);
        assert_eq!("gst-log".parse::<InputFormat>().unwrap(), InputFormat::GstLog);
        assert!("csv".parse::<InputFormat>().is_err());
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(InputFormat::detect("{\"phase\":\"begin\"}"), InputFormat::JsonLines);
        assert_eq!(
            InputFormat::detect("0:00:00.1 1 0x1 TRACE GST_TRACER :0:: query"),
            InputFormat::GstLog
        );
    }

    #[test]
    fn test_comment_lines_do_not_hide_json() {
        let text = "# recorded on host x\n\n{\"phase\":\"begin\",\"thread\":1,\"ts\":0,\"query\":\"caps\",\"pad\":\"src\"}\n";
        assert_eq!(first_record_line(text).chars().next(), Some('{'));

        let events = parse_events(text, None, false).unwrap();
        assert_eq!(events.len(), 1);
    }
}
