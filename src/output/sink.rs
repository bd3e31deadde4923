//! Destinations for completed trees.
//!
//! Sinks run on the thread that closed the tree, inside `on_end`. They
//! take ownership of the tree and drop it when done, which releases every
//! node. Write failures are logged and swallowed so tracing can never
//! fail the traced application.

use super::renderer::Renderer;
use super::schema::TreeReport;
use crate::correlator::{CorrelationTree, TreeSink};
use log::warn;
use parking_lot::Mutex;
use std::io::{self, Write};

/// Renders each completed tree as text into a writer
#[derive(Debug)]
pub struct TextSink<W: Write + Send> {
    renderer: Renderer,
    out: Mutex<W>,
}

impl TextSink<io::Stdout> {
    /// Sink printing to standard output
    pub fn stdout(renderer: Renderer) -> Self {
        Self::new(renderer, io::stdout())
    }
}

impl<W: Write + Send> TextSink<W> {
    pub fn new(renderer: Renderer, out: W) -> Self {
        Self {
            renderer,
            out: Mutex::new(out),
        }
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> TreeSink for TextSink<W> {
    fn accept(&self, tree: CorrelationTree) {
        let mut out = self.out.lock();
        let thread = tree.thread();
        if let Err(e) = self.renderer.render(tree, &mut *out).and_then(|_| out.flush()) {
            warn!("Failed to print tree for thread {}: {}", thread, e);
        }
    }
}

/// Keeps a serializable snapshot of every completed tree
///
/// Optionally echoes each tree as text to stdout as it arrives.
#[derive(Debug, Default)]
pub struct ReportSink {
    echo: Option<Renderer>,
    reports: Mutex<Vec<TreeReport>>,
}

impl ReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also print each tree to stdout with `renderer`
    pub fn with_echo(mut self, renderer: Renderer) -> Self {
        self.echo = Some(renderer);
        self
    }

    /// Copy of the reports collected so far
    pub fn reports(&self) -> Vec<TreeReport> {
        self.reports.lock().clone()
    }

    pub fn into_reports(self) -> Vec<TreeReport> {
        self.reports.into_inner()
    }
}

impl TreeSink for ReportSink {
    fn accept(&self, tree: CorrelationTree) {
        let report = TreeReport::from_tree(&tree);

        if let Some(renderer) = &self.echo {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            if let Err(e) = renderer.render(tree, &mut out) {
                warn!("Failed to print tree: {}", e);
            }
        }

        if let Some(report) = report {
            self.reports.lock().push(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlator::Correlator;
    use crate::parser::{BeginEvent, EndEvent, EndpointId, QueryType, ThreadKey};

    fn run<S: TreeSink>(correlator: &Correlator<S>) {
        correlator.on_begin(&BeginEvent {
            thread: ThreadKey(4),
            timestamp: 0,
            query: QueryType::AcceptCaps,
            endpoint: EndpointId::new("sink"),
            peer: Some(EndpointId::new("src")),
            filter: None,
        });
        correlator.on_end(&EndEvent {
            thread: ThreadKey(4),
            timestamp: 2,
            query: QueryType::AcceptCaps,
            endpoint: EndpointId::new("sink"),
            peer: Some(EndpointId::new("src")),
            success: true,
            caps: None,
            accepted: Some(true),
        });
    }

    #[test]
    fn test_text_sink_writes_tree() {
        let correlator = Correlator::new(TextSink::new(Renderer::default(), Vec::new()));
        run(&correlator);

        let text = String::from_utf8(correlator.into_sink().into_inner()).unwrap();
        assert_eq!(text, "  sink -> src : accept-caps\n\n");
    }

    #[test]
    fn test_report_sink_collects_snapshot() {
        let correlator = Correlator::new(ReportSink::new());
        run(&correlator);

        let reports = correlator.sink().reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].thread, 4);
        assert_eq!(reports[0].root.result.as_deref(), Some("accepted=true"));
    }
}
