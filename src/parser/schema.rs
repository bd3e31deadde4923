//! Event data model shared by the hook boundary and the log readers.
//!
//! Events are ephemeral: they are built by whoever observes a query
//! (an in-process hook or a log reader) and consumed immediately by the
//! correlator. Caps payloads are opaque strings here; nothing in this
//! crate interprets them.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic clock value in nanoseconds
pub type Timestamp = u64;

/// Opaque identity of the thread that emitted an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadKey(pub u64);

static NEXT_THREAD_KEY: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_THREAD_KEY: Cell<Option<ThreadKey>> = const { Cell::new(None) };
}

impl ThreadKey {
    /// Key of the calling OS thread
    ///
    /// **Public** - used by in-process hooks that run on the querying thread
    ///
    /// The key is allocated on first use and stays the same for the
    /// lifetime of the thread. Two live threads never share a key.
    pub fn current() -> Self {
        CURRENT_THREAD_KEY.with(|slot| match slot.get() {
            Some(key) => key,
            None => {
                let key = ThreadKey(NEXT_THREAD_KEY.fetch_add(1, Ordering::Relaxed));
                slot.set(Some(key));
                key
            }
        })
    }
}

impl fmt::Display for ThreadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Name of a pad (or element) taking part in a query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(pub String);

impl EndpointId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque capability descriptor, stored and printed verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Caps(pub String);

impl Caps {
    pub fn new(desc: impl Into<String>) -> Self {
        Self(desc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Caps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of query carried by an event
///
/// Only `Caps` and `AcceptCaps` are traced. Any other query name
/// deserializes to `Other` and is dropped at the correlator boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryType {
    Caps,
    AcceptCaps,
    #[serde(other)]
    Other,
}

impl QueryType {
    /// Whether the correlator builds trees for this query kind
    pub fn is_traced(self) -> bool {
        matches!(self, QueryType::Caps | QueryType::AcceptCaps)
    }

    /// Query type name as GStreamer prints it
    pub fn name(self) -> &'static str {
        match self {
            QueryType::Caps => "caps",
            QueryType::AcceptCaps => "accept-caps",
            QueryType::Other => "other",
        }
    }

    /// Parse a GStreamer query type name
    ///
    /// Unknown names map to `Other` rather than failing.
    pub fn from_name(name: &str) -> Self {
        match name {
            "caps" => QueryType::Caps,
            "accept-caps" => QueryType::AcceptCaps,
            _ => QueryType::Other,
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Query started on a pad
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeginEvent {
    pub thread: ThreadKey,

    #[serde(rename = "ts")]
    pub timestamp: Timestamp,

    pub query: QueryType,

    /// Pad that issued the query
    #[serde(rename = "pad")]
    pub endpoint: EndpointId,

    /// Pad linked to `endpoint`, if any
    #[serde(default)]
    pub peer: Option<EndpointId>,

    /// Filter caps (caps query) or proposed caps (accept-caps query)
    #[serde(default)]
    pub filter: Option<Caps>,
}

/// Query finished on a pad
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndEvent {
    pub thread: ThreadKey,

    #[serde(rename = "ts")]
    pub timestamp: Timestamp,

    pub query: QueryType,

    #[serde(rename = "pad")]
    pub endpoint: EndpointId,

    #[serde(default)]
    pub peer: Option<EndpointId>,

    /// Return value of the query function
    #[serde(alias = "res")]
    pub success: bool,

    /// Caps answered by a caps query (may be absent even on success)
    #[serde(default)]
    pub caps: Option<Caps>,

    /// Explicit result flag of an accept-caps query
    #[serde(default)]
    pub accepted: Option<bool>,
}

impl EndEvent {
    /// Interpret the result payload according to the query kind
    pub fn result(&self) -> QueryResult {
        match self.query {
            QueryType::Caps => QueryResult::Caps(self.caps.clone()),
            QueryType::AcceptCaps => QueryResult::Accepted(self.accepted.unwrap_or(self.success)),
            QueryType::Other => QueryResult::Unknown,
        }
    }
}

/// Outcome payload recorded on a closed tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// Caps answered by a caps query
    Caps(Option<Caps>),
    /// Whether an accept-caps query accepted the proposed caps
    Accepted(bool),
    Unknown,
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Caps(Some(caps)) => write!(f, "{}", caps),
            QueryResult::Caps(None) => f.write_str(crate::utils::config::NO_CAPS_MARKER),
            QueryResult::Accepted(accepted) => write!(f, "accepted={}", accepted),
            QueryResult::Unknown => f.write_str("?"),
        }
    }
}

/// One line of an event stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum TraceEvent {
    Begin(BeginEvent),
    End(EndEvent),
}

impl TraceEvent {
    pub fn thread(&self) -> ThreadKey {
        match self {
            TraceEvent::Begin(e) => e.thread,
            TraceEvent::End(e) => e.thread,
        }
    }

    pub fn query(&self) -> QueryType {
        match self {
            TraceEvent::Begin(e) => e.query,
            TraceEvent::End(e) => e.query,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        match self {
            TraceEvent::Begin(e) => e.timestamp,
            TraceEvent::End(e) => e.timestamp,
        }
    }
}
