//! Caps Nego Trace
//!
//! Reconstructs the call trees of nested caps and accept-caps queries
//! from begin/end events tagged with the querying thread, and renders
//! each tree once its top-level query returns.
//!
//! The [`correlator::Correlator`] can be driven in-process from query
//! hooks (it runs inline on the calling thread) or fed a recorded
//! event log through the `caps-nego-trace` CLI:
//!
//! ```bash
//! caps-nego-trace analyze --input trace.log --json report.json
//! ```

pub mod commands;
pub mod correlator;
pub mod output;
pub mod parser;
pub mod utils;
