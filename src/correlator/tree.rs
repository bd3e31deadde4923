//! Per-thread call tree of nested queries.
//!
//! Nodes live in an arena owned by the tree and refer to each other by
//! `NodeId`. The cursor is the innermost open query on the thread; it
//! moves down on every begin and back up on every end. The tree is
//! complete once the root has been closed and the cursor is gone.

use super::node::{NodeId, Outcome, TreeNode};
use crate::parser::{BeginEvent, EndEvent, ThreadKey};
use crate::utils::error::CorrelationError;

/// Call tree of one thread's top-level negotiation
#[derive(Debug, Clone)]
pub struct CorrelationTree {
    thread: ThreadKey,
    nodes: Vec<TreeNode>,
    root: Option<NodeId>,
    cursor: Option<NodeId>,
    open_depth: usize,
}

impl CorrelationTree {
    /// Empty tree: no root and no cursor
    pub fn new(thread: ThreadKey) -> Self {
        Self {
            thread,
            nodes: Vec::new(),
            root: None,
            cursor: None,
            open_depth: 0,
        }
    }

    /// Open a new query under the cursor
    ///
    /// **Public** - the only operation that makes the tree deeper
    ///
    /// The first query becomes the root. Later ones are appended as the
    /// last child of the cursor. Either way the new node becomes the
    /// cursor.
    ///
    /// # Returns
    /// Nesting depth after the push (1 for the root)
    pub fn open(&mut self, event: &BeginEvent) -> usize {
        let id = NodeId(self.nodes.len());

        match self.cursor {
            Some(parent) => {
                self.nodes.push(TreeNode::from_begin(event, Some(parent)));
                self.nodes[parent.0].push_child(id);
            }
            None => {
                debug_assert!(self.root.is_none(), "open() on a completed tree");
                self.nodes.push(TreeNode::from_begin(event, None));
                self.root = Some(id);
            }
        }

        self.cursor = Some(id);
        self.open_depth += 1;
        self.open_depth
    }

    /// Close the query at the cursor and move the cursor to its parent
    ///
    /// **Public** - called for every end event on this thread
    ///
    /// # Returns
    /// Nesting depth after the pop; 0 means the tree just completed
    ///
    /// # Errors
    /// * `CorrelationError::NoOpenQuery` - Nothing is open on this thread
    /// * `CorrelationError::QueryTypeMismatch` - End does not match the open query
    /// * `CorrelationError::AlreadyComplete` - Cursor node was already closed
    ///
    /// On error the tree is left untouched.
    pub fn close(&mut self, event: &EndEvent) -> Result<usize, CorrelationError> {
        let cursor = self.cursor.ok_or(CorrelationError::NoOpenQuery {
            thread: self.thread,
            query: event.query,
        })?;

        let node = &mut self.nodes[cursor.0];
        if node.query() != event.query {
            return Err(CorrelationError::QueryTypeMismatch {
                thread: self.thread,
                open: node.query(),
                got: event.query,
            });
        }

        // Unreachable while the cursor only points at open nodes; the node still rejects a second close
        node.complete(
            self.thread,
            event.timestamp,
            Outcome {
                success: event.success,
                result: event.result(),
            },
        )?;

        self.cursor = node.parent();
        self.open_depth -= 1;
        Ok(self.open_depth)
    }

    pub fn thread(&self) -> ThreadKey {
        self.thread
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn cursor(&self) -> Option<NodeId> {
        self.cursor
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    /// Root node, if the tree has one
    pub fn root_node(&self) -> Option<&TreeNode> {
        self.root.map(|id| self.node(id))
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True while no begin has been recorded
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// True once the root query has been closed
    pub fn is_complete(&self) -> bool {
        self.root.is_some() && self.cursor.is_none()
    }

    /// Number of queries currently open on the thread
    pub fn open_depth(&self) -> usize {
        self.open_depth
    }

    /// Nodes in pre-order (root first, children in begin order)
    ///
    /// Each item carries the node's nesting depth, starting at 1 for the root.
    pub fn walk(&self) -> Vec<(usize, &TreeNode)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, NodeId)> = self.root.map(|r| (1, r)).into_iter().collect();

        while let Some((depth, id)) = stack.pop() {
            let node = self.node(id);
            out.push((depth, node));
            stack.extend(node.children().iter().rev().map(|c| (depth + 1, *c)));
        }

        out
    }
}
