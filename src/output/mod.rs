//! Rendering and output of completed call trees.
//!
//! This module handles:
//! - Text rendering of trees (minimal and detailed)
//! - Sinks receiving trees from the correlator
//! - JSON reports

pub mod json;
pub mod renderer;
pub mod schema;
pub mod sink;

// Re-export main functions and types
pub use json::{read_report, report_to_string, write_report};
pub use renderer::{RenderStyle, Renderer};
pub use schema::{NodeReport, Report, TreeReport};
pub use sink::{ReportSink, TextSink};
