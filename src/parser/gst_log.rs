//! GStreamer tracer log reader.
//!
//! Reads query records written by the GStreamer `stats`-style tracers into
//! the debug log, e.g.
//!
//! ```text
//! 0:00:00.1 4242 0x1e3c0a0 TRACE GST_TRACER :0:: query, thread-id=(guint64)31604896, ts=(guint64)100, pad-ix=(uint)3, elem-ix=(uint)1, peer-pad-ix=(uint)4, peer-elem-ix=(uint)2, name=(string)caps, structure=(structure)"query-caps\,\ filter\=\(GstCaps\)NULL\,\ caps\=\(GstCaps\)NULL\;", res=(boolean)1;
//! ```
//!
//! A record carrying a `res` field is the post-query (End) half.

use super::schema::{BeginEvent, Caps, EndEvent, EndpointId, QueryType, ThreadKey, TraceEvent};
use crate::utils::config::{GST_MIN_TOKENS, GST_TRACER_TOKEN, NO_ELEMENT_INDEX};
use crate::utils::error::ParseError;
use log::{debug, warn};

/// A parsed GStreamer structure: `name, key=(type)value, ...;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GstStructure {
    pub name: String,
    pub fields: Vec<(String, String)>,
}

impl GstStructure {
    /// Raw (unescaped, type-stripped) value of a field
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(parse_u64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(parse_bool)
    }

    /// Caps field, with GStreamer's `NULL` mapped to `None`
    pub fn get_caps(&self, key: &str) -> Option<Caps> {
        match self.get(key) {
            None | Some("NULL") | Some("") => None,
            Some(v) => Some(Caps::new(v)),
        }
    }
}

/// Parse a serialized GStreamer structure
///
/// **Public** - also used for the nested `structure` field of query records
///
/// Returns `None` when the text has no structure name.
pub fn parse_structure(text: &str) -> Option<GstStructure> {
    let text = text.trim();
    let text = text.strip_suffix(';').unwrap_or(text);

    let mut parts = split_top_level(text).into_iter();
    let name = parts.next()?.trim().to_string();
    if name.is_empty() || name.contains('=') {
        return None;
    }

    let fields = parts
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            Some((key.trim().to_string(), clean_value(value.trim())))
        })
        .collect();

    Some(GstStructure { name, fields })
}

/// Split on commas that are neither escaped nor inside double quotes
fn split_top_level(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);

    parts
}

/// Strip a `(type)` prefix and surrounding quotes, then unescape
fn clean_value(raw: &str) -> String {
    let value = match raw.strip_prefix('(') {
        Some(rest) => rest.split_once(')').map(|(_, v)| v).unwrap_or(raw),
        None => raw,
    };

    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);

    unescape(value)
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn parse_u64(value: &str) -> Option<u64> {
    let value = value.trim();
    match value.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "TRUE" | "yes" => Some(true),
        "0" | "false" | "FALSE" | "no" => Some(false),
        _ => None,
    }
}

/// Extract the structure text of a tracer line, if it is one
///
/// The level column must mention `TRACE` and a `GST_TRACER` category
/// column must follow it; the structure starts two tokens later.
fn tracer_payload(line: &str) -> Option<String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < GST_MIN_TOKENS || !tokens[3].contains("TRACE") {
        return None;
    }

    let marker = tokens
        .iter()
        .skip(4)
        .position(|t| *t == GST_TRACER_TOKEN)?
        + 4;

    let payload = tokens.get(marker + 2..)?;
    if payload.is_empty() {
        return None;
    }

    Some(payload.join(" "))
}

/// Name an endpoint after its element; pads without an element have no name
fn endpoint_name(elem_ix: Option<u64>) -> Option<EndpointId> {
    match elem_ix {
        Some(elem) if elem != NO_ELEMENT_INDEX => Some(EndpointId::new(format!("elem{}", elem))),
        _ => None,
    }
}

/// Parse one debug log line
///
/// **Public** - entry point for a single line
///
/// # Returns
/// `None` when the line is not a tracer query record, or when the queried
/// pad belongs to no element
///
/// # Errors
/// * `ParseError::InvalidFormat` - Query record lacks thread, timestamp or name
pub fn parse_gst_line(line_no: usize, line: &str) -> Result<Option<TraceEvent>, ParseError> {
    let payload = match tracer_payload(line) {
        Some(p) => p,
        None => return Ok(None),
    };

    let record = match parse_structure(&payload) {
        Some(s) if s.name == "query" => s,
        _ => return Ok(None),
    };

    let invalid = |reason: &str| ParseError::InvalidFormat {
        line: line_no,
        reason: reason.to_string(),
    };

    let thread = ThreadKey(record.get_u64("thread-id").ok_or_else(|| invalid("missing thread-id"))?);
    let timestamp = record.get_u64("ts").ok_or_else(|| invalid("missing ts"))?;
    let query = QueryType::from_name(record.get("name").ok_or_else(|| invalid("missing name"))?);

    // Both halves of a query carry the same element index, so pairs are skipped together
    let endpoint = match endpoint_name(record.get_u64("elem-ix")) {
        Some(e) => e,
        None => {
            debug!("Line {}: skipping {} query on a pad with no element", line_no, query);
            return Ok(None);
        }
    };
    let peer = endpoint_name(record.get_u64("peer-elem-ix"));

    let inner = record.get("structure").and_then(parse_structure);

    let event = if record.has_field("res") {
        let success = record.get_bool("res").ok_or_else(|| invalid("bad res value"))?;
        let (caps, accepted) = match (&inner, query) {
            (Some(s), QueryType::Caps) => (s.get_caps("caps"), None),
            (Some(s), QueryType::AcceptCaps) => (None, s.get_bool("result")),
            _ => (None, None),
        };
        TraceEvent::End(EndEvent {
            thread,
            timestamp,
            query,
            endpoint,
            peer,
            success,
            caps,
            accepted,
        })
    } else {
        let filter = match (&inner, query) {
            (Some(s), QueryType::Caps) => s.get_caps("filter"),
            (Some(s), QueryType::AcceptCaps) => s.get_caps("caps"),
            _ => None,
        };
        TraceEvent::Begin(BeginEvent {
            thread,
            timestamp,
            query,
            endpoint,
            peer,
            filter,
        })
    };

    Ok(Some(event))
}

/// Parse a whole debug log
///
/// **Public** - main entry point for GStreamer log input
///
/// Lines that are not tracer query records are skipped silently.
/// Broken query records fail the parse unless `lenient` is set.
pub fn parse_gst_log(text: &str, lenient: bool) -> Result<Vec<TraceEvent>, ParseError> {
    let mut events = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        match parse_gst_line(idx + 1, line) {
            Ok(Some(event)) => events.push(event),
            Ok(None) => {}
            Err(e) if lenient => warn!("Skipping tracer record: {}", e),
            Err(e) => return Err(e),
        }
    }

    debug!("Parsed {} query records from tracer log", events.len());

    Ok(events)
}
