//! The correlator: turns begin/end events into per-thread call trees.
//!
//! Both entry points run synchronously on the calling thread. The cost
//! of each call is one registry lock plus O(1) tree work, and a tree that
//! completes is rendered on the closing thread before the call returns.
//! Anomalies never propagate to the caller; they are logged, counted and
//! reported back as a `Disposition`.

use super::registry::TreeRegistry;
use super::stats::CorrelatorStats;
use super::tree::CorrelationTree;
use crate::parser::{BeginEvent, EndEvent, EndpointId, TraceEvent};
use crate::utils::config::NO_PEER_MARKER;
use crate::utils::error::CorrelationError;
use log::{debug, warn};

/// Receiver of completed trees
///
/// Implementations own the tree from this point on and drop it once
/// they are done with it.
pub trait TreeSink: Send + Sync {
    fn accept(&self, tree: CorrelationTree);
}

/// What an event did to the correlator's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Query type is not traced; nothing was touched
    Ignored,

    /// A query was opened at the given nesting depth
    Opened { depth: usize },

    /// A nested query closed; the tree is still open at `depth`
    Closed { depth: usize },

    /// The root closed and the tree of `nodes` queries was handed off
    Completed { nodes: usize },

    /// The event was dropped as a protocol mismatch
    Discarded(CorrelationError),
}

/// Event-correlation engine
///
/// Owns its registry, so independent instances never share state.
#[derive(Debug)]
pub struct Correlator<S: TreeSink> {
    registry: TreeRegistry,
    stats: CorrelatorStats,
    sink: S,
}

impl<S: TreeSink> Correlator<S> {
    /// Create a correlator that hands completed trees to `sink`
    pub fn new(sink: S) -> Self {
        Self {
            registry: TreeRegistry::new(),
            stats: CorrelatorStats::new(),
            sink,
        }
    }

    /// Handle the start of a query
    ///
    /// **Public** - hook entry point, called before the query runs
    ///
    /// Appends a node under the thread's cursor (or starts a new tree) and
    /// moves the cursor onto it.
    pub fn on_begin(&self, event: &BeginEvent) -> Disposition {
        if !event.query.is_traced() {
            self.stats.record_ignored();
            return Disposition::Ignored;
        }

        debug!(
            "{} -> {} - pre {} query (thread {})",
            event.endpoint,
            display_peer(event.peer.as_ref()),
            event.query,
            event.thread
        );

        let (depth, _) = self.registry.with_tree(event.thread, |tree| tree.open(event));
        self.stats.record_begin(depth);

        Disposition::Opened { depth }
    }

    /// Handle the end of a query
    ///
    /// **Public** - hook entry point, called after the query returns
    ///
    /// Closes the thread's cursor node and moves the cursor up. When the
    /// root closes, the tree leaves the registry and goes to the sink.
    /// An end that does not match the open query is discarded and the tree
    /// keeps its last valid state.
    pub fn on_end(&self, event: &EndEvent) -> Disposition {
        if !event.query.is_traced() {
            self.stats.record_ignored();
            return Disposition::Ignored;
        }

        debug!(
            "{} -> {} - post {} query (thread {}, res={})",
            event.endpoint,
            display_peer(event.peer.as_ref()),
            event.query,
            event.thread,
            event.success
        );

        let (closed, completed) = self.registry.with_tree(event.thread, |tree| tree.close(event));

        let depth = match closed {
            Ok(depth) => depth,
            Err(e) => {
                warn!("Protocol mismatch, discarding event: {}", e);
                self.stats.record_mismatch();
                return Disposition::Discarded(e);
            }
        };

        self.stats.record_end();

        match completed {
            Some(tree) => {
                let nodes = tree.len();
                debug!("Tree for thread {} complete ({} queries)", tree.thread(), nodes);
                self.stats.record_completed();
                self.sink.accept(tree);
                Disposition::Completed { nodes }
            }
            None => Disposition::Closed { depth },
        }
    }

    /// Dispatch a parsed event to `on_begin` or `on_end`
    pub fn ingest(&self, event: &TraceEvent) -> Disposition {
        match event {
            TraceEvent::Begin(begin) => self.on_begin(begin),
            TraceEvent::End(end) => self.on_end(end),
        }
    }

    /// Remove every tree that is still waiting for its root to close
    ///
    /// **Public** - used at the end of an offline replay to report
    /// negotiations that never finished. The live engine never evicts.
    pub fn drain_incomplete(&self) -> Vec<CorrelationTree> {
        self.registry.drain()
    }

    pub fn registry(&self) -> &TreeRegistry {
        &self.registry
    }

    pub fn stats(&self) -> &CorrelatorStats {
        &self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

fn display_peer(peer: Option<&EndpointId>) -> &str {
    peer.map(|p| p.as_str()).unwrap_or(NO_PEER_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{QueryType, ThreadKey};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<CorrelationTree>>);

    impl TreeSink for Collect {
        fn accept(&self, tree: CorrelationTree) {
            self.0.lock().push(tree);
        }
    }

    fn begin(query: QueryType) -> BeginEvent {
        BeginEvent {
            thread: ThreadKey(1),
            timestamp: 0,
            query,
            endpoint: EndpointId::new("a"),
            peer: None,
            filter: None,
        }
    }

    fn end(query: QueryType) -> EndEvent {
        EndEvent {
            thread: ThreadKey(1),
            timestamp: 1,
            query,
            endpoint: EndpointId::new("a"),
            peer: None,
            success: true,
            caps: None,
            accepted: None,
        }
    }

    #[test]
    fn test_untraced_queries_do_not_touch_registry() {
        let correlator = Correlator::new(Collect::default());

        assert_eq!(correlator.on_begin(&begin(QueryType::Other)), Disposition::Ignored);
        assert_eq!(correlator.on_end(&end(QueryType::Other)), Disposition::Ignored);
        assert!(correlator.registry().is_empty());
        assert_eq!(correlator.stats().snapshot().ignored, 2);
    }

    #[test]
    fn test_single_query_completes() {
        let correlator = Correlator::new(Collect::default());

        assert_eq!(
            correlator.on_begin(&begin(QueryType::Caps)),
            Disposition::Opened { depth: 1 }
        );
        assert_eq!(
            correlator.on_end(&end(QueryType::Caps)),
            Disposition::Completed { nodes: 1 }
        );
        assert!(correlator.registry().is_empty());
        assert_eq!(correlator.sink().0.lock().len(), 1);
    }

    #[test]
    fn test_stray_end_is_discarded() {
        let correlator = Correlator::new(Collect::default());

        let disposition = correlator.on_end(&end(QueryType::Caps));
        assert!(matches!(
            disposition,
            Disposition::Discarded(CorrelationError::NoOpenQuery { .. })
        ));
        assert!(correlator.registry().is_empty());
        assert_eq!(correlator.stats().snapshot().mismatches, 1);
    }
}
