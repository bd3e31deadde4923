//! JSON-lines event log reader.
//!
//! One `TraceEvent` per line, e.g.
//!
//! ```text
//! {"phase":"begin","thread":1,"ts":0,"query":"caps","pad":"src","peer":"sink"}
//! {"phase":"end","thread":1,"ts":5,"query":"caps","pad":"src","peer":"sink","success":true,"caps":"video/x-raw"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use super::schema::TraceEvent;
use crate::utils::error::ParseError;
use log::{debug, warn};

/// Parse a single JSON line
///
/// **Public** - used by the streaming reader and by tests
///
/// # Arguments
/// * `line_no` - 1-based line number, reported in errors
/// * `line` - Raw line text
///
/// # Returns
/// `None` for blank and comment lines, the event otherwise
///
/// # Errors
/// * `ParseError::JsonError` - Line is not a valid event object
pub fn parse_json_line(line_no: usize, line: &str) -> Result<Option<TraceEvent>, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|source| ParseError::JsonError {
            line: line_no,
            source,
        })
}

/// Parse a whole JSON-lines document
///
/// **Public** - main entry point for JSON-lines input
///
/// # Arguments
/// * `text` - Document contents
/// * `lenient` - Skip malformed lines with a warning instead of failing
///
/// # Errors
/// * `ParseError::JsonError` - First malformed line (strict mode only)
pub fn parse_json_lines(text: &str, lenient: bool) -> Result<Vec<TraceEvent>, ParseError> {
    let mut events = Vec::new();
    let mut skipped = 0usize;

    for (idx, line) in text.lines().enumerate() {
        match parse_json_line(idx + 1, line) {
            Ok(Some(event)) => events.push(event),
            Ok(None) => {}
            Err(e) if lenient => {
                warn!("Skipping malformed event: {}", e);
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    debug!("Parsed {} events ({} skipped)", events.len(), skipped);

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::schema::QueryType;

    #[test]
    fn test_skips_blank_and_comment_lines() {
        assert!(parse_json_line(1, "   ").unwrap().is_none());
        assert!(parse_json_line(2, "# recorded on host x").unwrap().is_none());
    }

    #[test]
    fn test_parses_begin_line() {
        let line = r#"{"phase":"begin","thread":7,"ts":10,"query":"accept-caps","pad":"a","filter":"audio/x-raw"}"#;
        let event = parse_json_line(1, line).unwrap().unwrap();

        assert_eq!(event.query(), QueryType::AcceptCaps);
        assert_eq!(event.timestamp(), 10);
        match event {
            TraceEvent::Begin(begin) => {
                assert!(begin.peer.is_none());
                assert_eq!(begin.filter.unwrap().as_str(), "audio/x-raw");
            }
            TraceEvent::End(_) => panic!("expected begin event"),
        }
    }

    #[test]
    fn test_strict_mode_reports_line_number() {
        let text = "\n{\"phase\":\"begin\"}\n";
        match parse_json_lines(text, false) {
            Err(ParseError::JsonError { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_lenient_mode_skips_bad_lines() {
        let text = concat!(
            "garbage\n",
            r#"{"phase":"end","thread":1,"ts":2,"query":"caps","pad":"a","res":false}"#,
            "\n"
        );
        let events = parse_json_lines(text, true).unwrap();
        assert_eq!(events.len(), 1);
    }
}
