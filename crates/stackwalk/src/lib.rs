//! Enumerate installable software stacks from a resolved dependency universe.
//!
//! The caller encodes its package universe as dense integers: every concrete
//! package version gets an id in `[0, N)`, every id gets a *type* (versions
//! of the same package name share a type), and dependencies are `(from, to)`
//! edges between ids. A [`StackWalker`] then streams every *installable
//! stack* (every set of packages that is transitively closed under the
//! dependency edges starting from the direct dependencies and contains at
//! most one package per type) to a byte sink in a framed wire format
//! (see [`stream`]).
//!
//! Enumeration is depth first and fully deterministic: two runs over the
//! same inputs produce byte-identical streams.
//!
//! # Example
//!
//! ```
//! use stackwalk::{DependencyGraph, StackReader, StackWalker};
//!
//! // Package 0 depends on a library that resolved to two candidate
//! // versions, packages 1 and 2. They share a type, so every stack picks
//! // exactly one of them.
//! let graph = DependencyGraph::new(vec![0], &[(0, 1), (0, 2)], vec![0, 1, 1]).unwrap();
//!
//! let mut out = Vec::new();
//! let mut walker = StackWalker::new(graph, &mut out);
//! let produced = walker.drain().unwrap();
//! drop(walker);
//!
//! assert_eq!(produced, 2);
//! let stacks = StackReader::new(out.as_slice()).read_to_stop().unwrap();
//! assert_eq!(stacks, vec![vec![0, 2], vec![0, 1]]);
//! ```

pub mod error;
pub mod graph;
pub mod id_set;
pub mod stream;
pub mod walker;

pub use error::{Result, WalkError};
pub use graph::{DependencyGraph, PackageId, TypeId, MAX_PACKAGE_COUNT};
pub use id_set::IdSet;
pub use stream::{StackReader, StackWriter, ITEM_SIZE, STREAM_DELIMITER, STREAM_STOP};
pub use walker::{Expander, Frontier, StackItem, StackWalker};
