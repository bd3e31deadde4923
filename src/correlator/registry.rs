//! Thread-indexed registry of in-flight call trees.
//!
//! The registry is the only state shared between negotiating threads.
//! Every access goes through one mutex. A thread is present iff it has
//! an incomplete tree: entries appear on the first begin and are taken
//! out the moment their root closes.

use super::tree::CorrelationTree;
use crate::parser::ThreadKey;
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Map from thread identity to its one in-flight tree
#[derive(Debug, Default)]
pub struct TreeRegistry {
    trees: Mutex<HashMap<ThreadKey, CorrelationTree>>,
}

impl TreeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` on the thread's tree, creating an empty one if absent
    ///
    /// **Public** - main entry point used by the correlator
    ///
    /// The lookup, the mutation and any follow-up removal happen under a
    /// single lock acquisition. After `f` returns, a tree that completed
    /// is removed and handed back; a tree that is still empty (nothing was
    /// ever opened in it) is dropped so no bare entry lingers.
    ///
    /// # Returns
    /// `f`'s result and, if the tree completed, the removed tree
    pub fn with_tree<R>(
        &self,
        thread: ThreadKey,
        f: impl FnOnce(&mut CorrelationTree) -> R,
    ) -> (R, Option<CorrelationTree>) {
        let mut trees = self.trees.lock();

        let tree = get_or_create(&mut trees, thread);
        let result = f(tree);
        let finished = tree.is_complete();
        let empty = tree.is_empty();

        let completed = if finished {
            trees.remove(&thread)
        } else {
            if empty {
                trees.remove(&thread);
            }
            None
        };

        (result, completed)
    }

    /// Remove the thread's tree
    ///
    /// No-op returning `None` if the thread has no entry.
    pub fn remove(&self, thread: ThreadKey) -> Option<CorrelationTree> {
        self.trees.lock().remove(&thread)
    }

    pub fn contains(&self, thread: ThreadKey) -> bool {
        self.trees.lock().contains_key(&thread)
    }

    /// Number of threads with an in-flight tree
    pub fn len(&self) -> usize {
        self.trees.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.lock().is_empty()
    }

    /// Copy of the thread's in-flight tree, for inspection
    pub fn snapshot(&self, thread: ThreadKey) -> Option<CorrelationTree> {
        self.trees.lock().get(&thread).cloned()
    }

    /// Threads with an in-flight tree, sorted
    pub fn threads(&self) -> Vec<ThreadKey> {
        let mut threads: Vec<ThreadKey> = self.trees.lock().keys().copied().collect();
        threads.sort();
        threads
    }

    /// Remove and return every in-flight tree, ordered by thread
    pub fn drain(&self) -> Vec<CorrelationTree> {
        let mut trees: Vec<CorrelationTree> = self.trees.lock().drain().map(|(_, t)| t).collect();
        trees.sort_by_key(|t| t.thread());
        trees
    }
}

/// Look up the thread's tree, inserting an empty one on first use
///
/// **Private** - caller must hold the registry lock
fn get_or_create(
    trees: &mut HashMap<ThreadKey, CorrelationTree>,
    thread: ThreadKey,
) -> &mut CorrelationTree {
    trees.entry(thread).or_insert_with(|| {
        debug!("Creating tree for thread {}", thread);
        CorrelationTree::new(thread)
    })
}
