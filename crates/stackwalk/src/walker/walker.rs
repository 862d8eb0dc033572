use std::io::Write;
use std::time::Instant;

use log::{debug, info};

use crate::error::Result;
use crate::graph::DependencyGraph;
use crate::stream::StackWriter;

use super::expand::Expander;
use super::frontier::Frontier;
use super::stack_item::StackItem;

/// Drives the depth-first enumeration and streams finished stacks to a
/// sink.
///
/// The walker is strictly single threaded; the caller decides the pacing by
/// choosing [`step`](Self::step) or [`drain`](Self::drain). The only
/// blocking points are the sink writes, so a pipe with a slow reader
/// back-pressures the enumeration. Closing the read end cancels the run:
/// the next write fails and the error surfaces from `step`/`drain`.
///
/// The sequence of emitted stacks is a pure function of the graph; two runs
/// over the same inputs produce byte-identical streams.
pub struct StackWalker<W: Write> {
    graph: DependencyGraph,
    frontier: Frontier,
    writer: StackWriter<W>,
    stopped: bool,
}

impl<W: Write> StackWalker<W> {
    /// Create a walker over `graph` writing the stack stream to `sink`.
    ///
    /// The initial frontier holds one state per way of choosing the direct
    /// dependencies at the type level, produced by the same grouping and
    /// cartesian rule the expander applies to requirements.
    pub fn new(graph: DependencyGraph, sink: W) -> Self {
        let mut frontier = Frontier::new();
        let package_capacity = graph.package_count();
        let type_capacity = graph.type_capacity();

        let expander = Expander::new(&graph);
        for tuple in expander.alternatives(graph.direct_dependencies()) {
            frontier.push(StackItem::new(tuple, package_capacity, type_capacity));
        }
        debug!("initial frontier holds {} states", frontier.len());

        Self {
            graph,
            frontier,
            writer: StackWriter::new(sink),
            stopped: false,
        }
    }

    /// Advance the enumeration until at most one stack has been emitted.
    ///
    /// Returns `Ok(true)` when a stack was written to the sink and
    /// `Ok(false)` once the frontier is exhausted. The stop marker is
    /// written exactly once, on the first exhausted call; later calls
    /// return `Ok(false)` without touching the sink.
    ///
    /// A sink write failure terminates the run: the error is returned, the
    /// word already written is not rolled back, and every later call
    /// returns `Ok(false)`. The consumer sees a truncated stream with no
    /// stop marker.
    pub fn step(&mut self) -> Result<bool> {
        if self.stopped {
            return Ok(false);
        }
        loop {
            let Some(item) = self.frontier.pop() else {
                self.stopped = true;
                self.writer.write_stop()?;
                return Ok(false);
            };

            if item.is_final() {
                if let Err(err) = self.writer.write_stack(item.packages()) {
                    self.stopped = true;
                    return Err(err.into());
                }
                return Ok(true);
            }

            let expander = Expander::new(&self.graph);
            for child in expander.expand_one(item) {
                self.frontier.push(child);
            }
        }
    }

    /// Produce every remaining stack, returning how many were emitted.
    pub fn drain(&mut self) -> Result<u64> {
        let start = Instant::now();
        let mut produced = 0u64;
        while self.step()? {
            produced += 1;
        }
        info!(
            "enumerated {} stacks in {:.3} seconds",
            produced,
            start.elapsed().as_secs_f64()
        );
        Ok(produced)
    }

    /// Number of states currently awaiting expansion.
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// The graph this walker enumerates.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }
}
