//! Configuration and constants for the analyzer.

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Indentation emitted once per tree depth level
pub const INDENT_STRING: &str = "  ";

/// Printed in place of a peer endpoint that is not linked
pub const NO_PEER_MARKER: &str = "none";

/// Printed in place of a missing caps payload
pub const NO_CAPS_MARKER: &str = "NULL";

/// Element index the GStreamer tracers log for pads without a parent element
pub const NO_ELEMENT_INDEX: u64 = 4_294_967_295;

/// Marker token GStreamer puts in the category column of tracer lines
pub const GST_TRACER_TOKEN: &str = "GST_TRACER";

/// Minimum whitespace-separated token count of a GStreamer tracer log line
pub const GST_MIN_TOKENS: usize = 8;
