//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use crate::parser::{QueryType, ThreadKey};
use thiserror::Error;

/// Anomalies detected while correlating begin/end events
///
/// None of these are fatal. The correlator discards the offending event,
/// logs the anomaly and carries on with every other thread.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorrelationError {
    #[error("end of {query} query on thread {thread} with no open query")]
    NoOpenQuery { thread: ThreadKey, query: QueryType },

    #[error("end of {got} query on thread {thread} while {open} query is open")]
    QueryTypeMismatch {
        thread: ThreadKey,
        open: QueryType,
        got: QueryType,
    },

    #[error("{query} query on thread {thread} was already completed")]
    AlreadyComplete { thread: ThreadKey, query: QueryType },
}

impl CorrelationError {
    /// Thread the anomaly was reported on
    pub fn thread(&self) -> ThreadKey {
        match self {
            CorrelationError::NoOpenQuery { thread, .. }
            | CorrelationError::QueryTypeMismatch { thread, .. }
            | CorrelationError::AlreadyComplete { thread, .. } => *thread,
        }
    }
}

/// Errors that can occur during event log parsing
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed on line {line}: {source}")]
    JsonError {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid tracer line {line}: {reason}")]
    InvalidFormat { line: usize, reason: String },

    #[error("Unknown input format: {0}")]
    UnknownFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
