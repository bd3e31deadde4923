//! A single traced query instance.

use crate::parser::{BeginEvent, Caps, EndpointId, QueryResult, QueryType, ThreadKey, Timestamp};
use crate::utils::error::CorrelationError;

/// Handle of a node inside its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Result of a closed query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Return value of the query
    pub success: bool,

    /// Caps answered, or the accept-caps verdict
    pub result: QueryResult,
}

/// One traced query
///
/// Begin-time fields are fixed at construction. `end_ts` and `outcome`
/// start unset and can be written exactly once, through `complete`.
#[derive(Debug, Clone)]
pub struct TreeNode {
    query: QueryType,
    endpoint: EndpointId,
    peer: Option<EndpointId>,
    filter: Option<Caps>,
    start_ts: Timestamp,
    end_ts: Option<Timestamp>,
    outcome: Option<Outcome>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TreeNode {
    /// Build an open node from a begin event
    pub(crate) fn from_begin(event: &BeginEvent, parent: Option<NodeId>) -> Self {
        Self {
            query: event.query,
            endpoint: event.endpoint.clone(),
            peer: event.peer.clone(),
            filter: event.filter.clone(),
            start_ts: event.timestamp,
            end_ts: None,
            outcome: None,
            parent,
            children: Vec::new(),
        }
    }

    /// Record the end of the query
    ///
    /// # Errors
    /// * `CorrelationError::AlreadyComplete` - End fields were already written
    pub(crate) fn complete(
        &mut self,
        thread: ThreadKey,
        end_ts: Timestamp,
        outcome: Outcome,
    ) -> Result<(), CorrelationError> {
        if self.is_complete() {
            return Err(CorrelationError::AlreadyComplete {
                thread,
                query: self.query,
            });
        }

        self.end_ts = Some(end_ts);
        self.outcome = Some(outcome);
        Ok(())
    }

    pub(crate) fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    pub fn is_complete(&self) -> bool {
        self.end_ts.is_some()
    }

    pub fn query(&self) -> QueryType {
        self.query
    }

    pub fn endpoint(&self) -> &EndpointId {
        &self.endpoint
    }

    pub fn peer(&self) -> Option<&EndpointId> {
        self.peer.as_ref()
    }

    pub fn filter(&self) -> Option<&Caps> {
        self.filter.as_ref()
    }

    pub fn start_ts(&self) -> Timestamp {
        self.start_ts
    }

    pub fn end_ts(&self) -> Option<Timestamp> {
        self.end_ts
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in begin order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Time spent in the query, once closed
    pub fn duration(&self) -> Option<Timestamp> {
        self.end_ts.map(|end| end.saturating_sub(self.start_ts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn begin() -> BeginEvent {
        BeginEvent {
            thread: ThreadKey(1),
            timestamp: 10,
            query: QueryType::Caps,
            endpoint: EndpointId::new("src"),
            peer: Some(EndpointId::new("sink")),
            filter: None,
        }
    }

    #[test]
    fn test_end_fields_are_write_once() {
        let mut node = TreeNode::from_begin(&begin(), None);
        assert!(!node.is_complete());
        assert_eq!(node.duration(), None);

        let outcome = Outcome {
            success: true,
            result: QueryResult::Caps(Some(Caps::new("video/x-raw"))),
        };
        node.complete(ThreadKey(1), 25, outcome.clone()).unwrap();
        assert!(node.is_complete());
        assert_eq!(node.duration(), Some(15));

        let second = node.complete(
            ThreadKey(1),
            40,
            Outcome {
                success: false,
                result: QueryResult::Caps(None),
            },
        );
        assert!(matches!(second, Err(CorrelationError::AlreadyComplete { .. })));
        assert_eq!(node.end_ts(), Some(25));
        assert_eq!(node.outcome(), Some(&outcome));
    }
}
