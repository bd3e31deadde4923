//! Output JSON schema definitions for analysis reports.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use crate::correlator::{CorrelationTree, NodeId, StatsSnapshot};
use crate::parser::QueryType;
use crate::utils::config::SCHEMA_VERSION;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Top-level report written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for compatibility checking
    pub version: String,

    /// Log file the report was built from, if any
    #[serde(default)]
    pub input: Option<String>,

    /// Correlator counters at the end of the run
    pub stats: StatsSnapshot,

    /// Completed trees, in completion order
    pub trees: Vec<TreeReport>,

    /// Trees whose root never closed
    #[serde(default)]
    pub orphaned: Vec<TreeReport>,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

impl Report {
    pub fn new(
        input: Option<String>,
        stats: StatsSnapshot,
        trees: Vec<TreeReport>,
        orphaned: Vec<TreeReport>,
    ) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            input,
            stats,
            trees,
            orphaned,
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// One thread's call tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeReport {
    /// Thread the negotiation ran on
    pub thread: u64,

    /// Number of queries in the tree
    pub query_count: usize,

    /// Top-level query
    pub root: NodeReport,
}

/// One query and its nested queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeReport {
    pub query: QueryType,
    pub endpoint: String,
    pub peer: Option<String>,
    pub filter: Option<String>,
    pub start_ts: u64,

    /// `None` while the query is still open
    pub end_ts: Option<u64>,
    pub success: Option<bool>,
    pub result: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeReport>,
}

impl TreeReport {
    /// Snapshot a tree, `None` if it has no root
    pub fn from_tree(tree: &CorrelationTree) -> Option<Self> {
        let root = tree.root()?;
        Some(Self {
            thread: tree.thread().0,
            query_count: tree.len(),
            root: node_report(tree, root),
        })
    }
}

/// Build the report of a node and its subtree
///
/// **Private** - recursion depth equals query nesting depth
fn node_report(tree: &CorrelationTree, id: NodeId) -> NodeReport {
    let node = tree.node(id);
    NodeReport {
        query: node.query(),
        endpoint: node.endpoint().to_string(),
        peer: node.peer().map(|p| p.to_string()),
        filter: node.filter().map(|c| c.to_string()),
        start_ts: node.start_ts(),
        end_ts: node.end_ts(),
        success: node.outcome().map(|o| o.success),
        result: node.outcome().map(|o| o.result.to_string()),
        children: node
            .children()
            .iter()
            .map(|child| node_report(tree, *child))
            .collect(),
    }
}
