//! End-to-end walker scenarios covering the enumeration contract: framing,
//! ordering, pruning, cycle tolerance and determinism.

use std::io::{self, Write};

use super::*;
use crate::error::WalkError;
use crate::graph::{DependencyGraph, PackageId};
use crate::stream::{StackReader, STREAM_DELIMITER, STREAM_STOP};

fn graph(direct: Vec<u16>, edges: &[(u16, u16)], types: Vec<u16>) -> DependencyGraph {
    DependencyGraph::new(direct, edges, types).unwrap()
}

/// Drain a walker into memory and decode the stream back into stacks.
fn run(graph: DependencyGraph) -> (Vec<Vec<PackageId>>, Vec<u8>) {
    let mut out = Vec::new();
    let mut walker = StackWalker::new(graph, &mut out);
    walker.drain().unwrap();
    drop(walker);

    let stacks = StackReader::new(out.as_slice()).read_to_stop().unwrap();
    (stacks, out)
}

fn words(stream: &[u8]) -> Vec<u16> {
    stream
        .chunks(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

#[test]
fn test_single_root_without_dependencies() {
    let (stacks, stream) = run(graph(vec![0], &[], vec![0]));

    assert_eq!(stacks, vec![vec![0]]);
    assert_eq!(words(&stream), vec![0, STREAM_DELIMITER, STREAM_STOP]);
}

#[test]
fn test_chain_is_admitted_in_dependency_order() {
    let (stacks, _) = run(graph(vec![0], &[(0, 1), (1, 2)], vec![0, 1, 2]));
    assert_eq!(stacks, vec![vec![0, 1, 2]]);
}

#[test]
fn test_same_type_roots_branch_into_alternative_stacks() {
    // Two same-type roots are alternatives, not companions: the initial
    // cartesian expansion produces one single-package stack per candidate,
    // most recently pushed first.
    let (stacks, _) = run(graph(vec![0, 1], &[], vec![0, 0]));
    assert_eq!(stacks, vec![vec![1], vec![0]]);
}

#[test]
fn test_type_conflict_deeper_in_the_graph_prunes_everything() {
    // 0 needs 1, 1 needs 2, but 2 shares a type with 1: no stack exists
    // and the stream is just the stop marker.
    let (stacks, stream) = run(graph(vec![0], &[(0, 1), (1, 2)], vec![0, 1, 1]));

    assert!(stacks.is_empty());
    assert_eq!(words(&stream), vec![STREAM_STOP]);
}

#[test]
fn test_diamond_admits_the_shared_dependency_once() {
    let (stacks, _) = run(graph(
        vec![0],
        &[(0, 1), (0, 2), (1, 3), (2, 3)],
        vec![0, 1, 2, 3],
    ));

    assert_eq!(stacks.len(), 1);
    // 3 appears exactly once despite being reachable over two paths; the
    // admission order follows the depth-first traversal.
    assert_eq!(stacks[0], vec![0, 1, 3, 2]);
}

#[test]
fn test_alternative_versions_produce_one_stack_each() {
    let (stacks, _) = run(graph(vec![0], &[(0, 1), (0, 2)], vec![0, 1, 1]));
    assert_eq!(stacks, vec![vec![0, 2], vec![0, 1]]);
}

#[test]
fn test_dependency_cycles_terminate() {
    let (stacks, _) = run(graph(vec![0], &[(0, 1), (1, 0)], vec![0, 1]));
    assert_eq!(stacks, vec![vec![0, 1]]);
}

#[test]
fn test_emitted_stacks_never_repeat_a_type_and_stay_closed() {
    // Two layers of alternatives with a shared tail.
    let graph = graph(
        vec![0, 1],
        &[(0, 2), (0, 3), (1, 2), (1, 3), (2, 4), (3, 4), (4, 5)],
        vec![0, 0, 1, 1, 2, 3],
    );
    let expected = graph.stacks_estimated();
    let (stacks, _) = run(graph);

    assert!(!stacks.is_empty());
    assert!((stacks.len() as u128) <= expected);

    let types = [0u16, 0, 1, 1, 2, 3];
    for stack in &stacks {
        // Type uniqueness.
        let mut seen = Vec::new();
        for &package in stack {
            let t = types[package as usize];
            assert!(!seen.contains(&t), "type {t} repeated in stack {stack:?}");
            seen.push(t);
        }
        // Closure up to type substitution: every requirement is either in
        // the stack or its type is covered by a same-type sibling.
        let edges = [
            (0u16, 2u16),
            (0, 3),
            (1, 2),
            (1, 3),
            (2, 4),
            (3, 4),
            (4, 5),
        ];
        for &package in stack {
            for &(from, to) in edges.iter().filter(|&&(from, _)| from == package) {
                assert!(
                    stack.contains(&to) || seen.contains(&types[to as usize]),
                    "stack {stack:?} misses requirement {to} of {from}"
                );
            }
        }
    }
}

#[test]
fn test_step_emits_one_stack_at_a_time_and_stop_is_idempotent() {
    let mut out = Vec::new();
    let mut walker = StackWalker::new(graph(vec![0], &[(0, 1), (0, 2)], vec![0, 1, 1]), &mut out);
    assert_eq!(walker.graph().package_count(), 3);
    assert_eq!(walker.frontier_len(), 1);

    assert!(walker.step().unwrap());
    assert!(walker.step().unwrap());
    assert!(!walker.step().unwrap());
    assert_eq!(walker.frontier_len(), 0);

    drop(walker);
    // Two stacks of two ids plus their delimiters, then one stop marker.
    assert_eq!(out.len(), 7 * 2);

    let mut walker = StackWalker::new(graph(vec![0], &[], vec![0]), io::sink());
    assert!(walker.step().unwrap());
    assert!(!walker.step().unwrap());
    // Once exhausted the walker stays exhausted.
    assert!(!walker.step().unwrap());
    assert!(!walker.step().unwrap());
}

#[test]
fn test_runs_are_byte_identical() {
    let build = || {
        graph(
            vec![0, 5],
            &[(0, 1), (0, 2), (1, 3), (2, 3), (3, 4), (5, 1), (5, 2)],
            vec![0, 1, 1, 2, 3, 4],
        )
    };
    let (_, first) = run(build());
    let (_, second) = run(build());
    assert_eq!(first, second);
}

/// Sink that fails once a byte budget is exhausted, standing in for a
/// closed pipe.
struct FailingSink {
    budget: usize,
}

impl Write for FailingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.len() > self.budget {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader is gone"));
        }
        self.budget -= buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_write_failure_terminates_the_run() {
    let graph = graph(vec![0], &[(0, 1), (0, 2)], vec![0, 1, 1]);
    let mut walker = StackWalker::new(graph, FailingSink { budget: 2 });

    let err = walker.drain().unwrap_err();
    assert!(matches!(err, WalkError::Io(_)));

    // The run is over: no retries, no stop marker, just end of stream.
    assert!(!walker.step().unwrap());
}

#[test]
fn test_multiple_type_groups_expand_as_a_cartesian_product() {
    // 0 needs one of {1, 2} and one of {3, 4}: four stacks, in the mixed
    // radix order fixed by the expander (last group least significant).
    let (stacks, _) = run(graph(
        vec![0],
        &[(0, 1), (0, 2), (0, 3), (0, 4)],
        vec![0, 1, 1, 2, 2],
    ));

    assert_eq!(
        stacks,
        vec![
            vec![0, 2, 4],
            vec![0, 2, 3],
            vec![0, 1, 4],
            vec![0, 1, 3],
        ]
    );
}
