//! Text rendering of completed call trees.
//!
//! One line per query in pre-order, indented twice per nesting level
//! (the root sits at level 1), followed by a blank separator line:
//!
//! ```text
//!   elem1 -> elem2 : caps
//!     elem2 -> elem1 : accept-caps
//!
//! ```

use crate::correlator::{CorrelationTree, TreeNode};
use crate::utils::config::{INDENT_STRING, NO_CAPS_MARKER, NO_PEER_MARKER};
use std::io::{self, Write};

/// How much of each node goes on its line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderStyle {
    /// Endpoint, peer and query type only
    #[default]
    Minimal,
    /// Minimal line plus timestamps, filter and outcome
    Detailed,
}

/// Tree-to-text renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    pub style: RenderStyle,
}

impl Renderer {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    pub fn detailed() -> Self {
        Self::new(RenderStyle::Detailed)
    }

    /// Format a single node at the given nesting depth
    pub fn render_line(&self, depth: usize, node: &TreeNode) -> String {
        let mut line = INDENT_STRING.repeat(depth);

        line.push_str(&format!(
            "{} -> {} : {}",
            node.endpoint(),
            node.peer().map(|p| p.as_str()).unwrap_or(NO_PEER_MARKER),
            node.query()
        ));

        if self.style == RenderStyle::Detailed {
            line.push_str(&format!(
                " : ts: {} : filter: {}",
                node.start_ts(),
                node.filter().map(|c| c.as_str()).unwrap_or(NO_CAPS_MARKER)
            ));

            match (node.outcome(), node.duration()) {
                (Some(outcome), Some(duration)) => line.push_str(&format!(
                    " : res: {} : result: {} : duration: {}",
                    outcome.success, outcome.result, duration
                )),
                _ => line.push_str(" : open"),
            }
        }

        line
    }

    /// Render every node of the tree, in pre-order
    ///
    /// **Public** - borrowing variant, leaves the tree intact
    pub fn render_lines(&self, tree: &CorrelationTree) -> Vec<String> {
        tree.walk()
            .into_iter()
            .map(|(depth, node)| self.render_line(depth, node))
            .collect()
    }

    /// Render the tree to `out` and dispose of it
    ///
    /// **Public** - main entry point used by sinks
    ///
    /// Writes one line per node and a blank separator line. The tree is
    /// consumed; all of its nodes are released when this returns.
    ///
    /// # Errors
    /// * I/O errors from `out`
    pub fn render<W: Write>(&self, tree: CorrelationTree, out: &mut W) -> io::Result<()> {
        for line in self.render_lines(&tree) {
            writeln!(out, "{}", line)?;
        }
        writeln!(out)?;
        drop(tree);
        Ok(())
    }

    /// Render the tree into a string, separator included
    pub fn render_to_string(&self, tree: &CorrelationTree) -> String {
        let mut text = String::new();
        for line in self.render_lines(tree) {
            text.push_str(&line);
            text.push('\n');
        }
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{BeginEvent, Caps, EndEvent, EndpointId, QueryType, ThreadKey};

    fn caps_tree() -> CorrelationTree {
        let mut tree = CorrelationTree::new(ThreadKey(1));
        tree.open(&BeginEvent {
            thread: ThreadKey(1),
            timestamp: 10,
            query: QueryType::Caps,
            endpoint: EndpointId::new("src"),
            peer: None,
            filter: Some(Caps::new("video/x-raw")),
        });
        tree.close(&EndEvent {
            thread: ThreadKey(1),
            timestamp: 14,
            query: QueryType::Caps,
            endpoint: EndpointId::new("src"),
            peer: None,
            success: true,
            caps: Some(Caps::new("video/x-raw, format=I420")),
            accepted: None,
        })
        .unwrap();
        tree
    }

    #[test]
    fn test_minimal_line() {
        let tree = caps_tree();
        assert_eq!(Renderer::default().render_lines(&tree), vec!["  src -> none : caps"]);
    }

    #[test]
    fn test_detailed_line() {
        let tree = caps_tree();
        assert_eq!(
            Renderer::detailed().render_lines(&tree),
            vec![
                "  src -> none : caps : ts: 10 : filter: video/x-raw : res: true : result: video/x-raw, format=I420 : duration: 4"
            ]
        );
    }

    #[test]
    fn test_render_appends_separator() {
        let mut out = Vec::new();
        Renderer::default().render(caps_tree(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "  src -> none : caps\n\n");
    }
}
