//! Event model and event log parsing.
//!
//! This module handles:
//! - Defining begin/end query events
//! - Parsing JSON-lines event logs
//! - Parsing GStreamer tracer debug logs

pub mod gst_log;
pub mod json_lines;
pub mod reader;
pub mod schema;

// Re-export main types
pub use reader::{parse_events, read_events, InputFormat};
pub use schema::{
    BeginEvent, Caps, EndEvent, EndpointId, QueryResult, QueryType, ThreadKey, Timestamp,
    TraceEvent,
};
