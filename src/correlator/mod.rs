//! Correlation of begin/end query events into per-thread call trees.
//!
//! This module provides:
//! - Tree nodes and the arena-backed correlation tree
//! - The thread-keyed registry of in-flight trees
//! - The correlator engine driving both from hook events
//! - Running statistics

pub mod engine;
pub mod node;
pub mod registry;
pub mod stats;
pub mod tree;

// Re-export main types
pub use engine::{Correlator, Disposition, TreeSink};
pub use node::{NodeId, Outcome, TreeNode};
pub use registry::TreeRegistry;
pub use stats::{CorrelatorStats, StatsSnapshot};
pub use tree::CorrelationTree;
