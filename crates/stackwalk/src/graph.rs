//! Immutable input tables for one enumeration run.

use log::debug;

use crate::error::{Result, WalkError};

/// Identifier of a concrete package version, dense in `[0, package_count)`.
pub type PackageId = u16;

/// Identifier of a package type.
///
/// Two packages with the same type are conflicting versions of the same
/// name: at most one of them may appear in any stack.
pub type TypeId = u16;

/// The largest package universe the stream encoding can address.
///
/// The top two `u16` values are reserved for the stream sentinels, so real
/// package ids stop two short of the full range.
pub const MAX_PACKAGE_COUNT: usize = (u16::MAX as usize) - 1;

/// The dependency graph over an integer-encoded package universe.
///
/// Built once per run from the caller's arrays and never mutated. Every
/// traversal state borrows the adjacency lists from here instead of
/// carrying its own copy.
#[derive(Debug)]
pub struct DependencyGraph {
    /// The initial roots of the resolution.
    direct: Vec<PackageId>,
    /// Type of each package, indexed by package id.
    type_of: Vec<TypeId>,
    /// Requirements of each package, indexed by package id.
    deps_of: Vec<Vec<PackageId>>,
}

impl DependencyGraph {
    /// Build the graph from the caller's arrays.
    ///
    /// `type_of` must assign a type to every package; its length is the
    /// package count. `edges` holds one `(from, to)` pair per dependency
    /// and may name a package more than once. Duplicate edges are kept and
    /// tolerated by the walker, but they inflate the search; callers
    /// should deduplicate. Cycles are allowed; the walker never expands an
    /// already admitted package a second time.
    pub fn new(
        direct: Vec<PackageId>,
        edges: &[(PackageId, PackageId)],
        type_of: Vec<TypeId>,
    ) -> Result<Self> {
        let count = type_of.len();
        if count > MAX_PACKAGE_COUNT {
            return Err(WalkError::CapacityOverflow {
                count,
                max: MAX_PACKAGE_COUNT,
            });
        }
        if direct.is_empty() {
            return Err(WalkError::NoDirectDependencies);
        }
        for &id in &direct {
            Self::check_id(id, count)?;
        }

        let mut deps_of = vec![Vec::new(); count];
        for &(from, to) in edges {
            Self::check_id(from, count)?;
            Self::check_id(to, count)?;
            deps_of[from as usize].push(to);
        }

        debug!(
            "dependency graph ready: {} packages, {} direct dependencies, {} edges",
            count,
            direct.len(),
            edges.len()
        );

        Ok(Self {
            direct,
            type_of,
            deps_of,
        })
    }

    fn check_id(id: PackageId, count: usize) -> Result<()> {
        if (id as usize) < count {
            Ok(())
        } else {
            Err(WalkError::PackageOutOfRange { id, count })
        }
    }

    /// Total number of packages in the universe.
    pub fn package_count(&self) -> usize {
        self.type_of.len()
    }

    /// The initial roots of the resolution.
    pub fn direct_dependencies(&self) -> &[PackageId] {
        &self.direct
    }

    /// Type of `package`.
    ///
    /// # Panics
    /// If `package` is outside the universe.
    pub fn type_of(&self, package: PackageId) -> TypeId {
        self.type_of[package as usize]
    }

    /// Requirements of `package`, in the order the caller stated them.
    ///
    /// # Panics
    /// If `package` is outside the universe.
    pub fn deps_of(&self, package: PackageId) -> &[PackageId] {
        &self.deps_of[package as usize]
    }

    /// One past the largest type id in use; the bitset capacity for type
    /// sets in traversal states.
    pub(crate) fn type_capacity(&self) -> usize {
        self.type_of
            .iter()
            .map(|&t| t as usize + 1)
            .max()
            .unwrap_or(0)
    }

    /// Upper bound on the number of stacks this graph can produce: the
    /// product of the per-type package counts. The walker usually emits
    /// far fewer because pruning cuts conflicting branches early.
    pub fn stacks_estimated(&self) -> u128 {
        let mut per_type = vec![0u64; self.type_capacity()];
        for &t in &self.type_of {
            per_type[t as usize] += 1;
        }
        per_type
            .iter()
            .filter(|&&n| n > 0)
            .fold(1u128, |acc, &n| acc.saturating_mul(n as u128))
    }
}
