use crate::graph::{PackageId, TypeId};
use crate::id_set::IdSet;

/// One partially expanded candidate stack.
///
/// Holds the packages already committed to the stack, the types those
/// packages occupy, and a LIFO queue of packages whose own requirements
/// still need processing. Once the queue is empty the state is final and
/// [`packages`](Self::packages) is a complete stack.
///
/// Invariant: the type set is exactly the image of the admitted set under
/// the graph's type mapping, and the admission-order vector holds exactly
/// the admitted packages in the order they were committed. Every operation
/// below preserves this.
#[derive(Debug, Clone)]
pub struct StackItem {
    /// Membership index over admitted packages.
    admitted: IdSet,
    /// Admitted packages in admission order; this is the emission order on
    /// the wire.
    admitted_order: Vec<PackageId>,
    /// Types occupied by the admitted packages.
    seen_types: IdSet,
    /// Packages waiting to be processed; the back is processed next.
    pending: Vec<PackageId>,
}

impl StackItem {
    /// Create a fresh state with nothing admitted and `pending` queued.
    ///
    /// The capacities size the two bitsets: one bit per package id and one
    /// per type id.
    pub(crate) fn new(
        pending: Vec<PackageId>,
        package_capacity: usize,
        type_capacity: usize,
    ) -> Self {
        Self {
            admitted: IdSet::with_capacity(package_capacity),
            admitted_order: Vec::new(),
            seen_types: IdSet::with_capacity(type_capacity),
            pending,
        }
    }

    /// Number of packages still waiting to be processed.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// `true` once nothing is left to process; [`packages`](Self::packages)
    /// then holds a complete stack.
    pub fn is_final(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return the most recently queued package.
    pub(crate) fn pop_pending(&mut self) -> Option<PackageId> {
        self.pending.pop()
    }

    /// Check whether `package` is already part of the stack.
    pub fn contains(&self, package: PackageId) -> bool {
        self.admitted.contains(package)
    }

    /// Check whether a package of `package_type` is already part of the
    /// stack.
    pub fn has_type(&self, package_type: TypeId) -> bool {
        self.seen_types.contains(package_type)
    }

    /// Commit `package` to the stack and mark its type as occupied.
    pub(crate) fn admit(&mut self, package: PackageId, package_type: TypeId) {
        debug_assert!(!self.admitted.contains(package));
        self.admitted.insert(package);
        self.admitted_order.push(package);
        self.seen_types.insert(package_type);
    }

    /// Queue `packages` for later processing.
    pub(crate) fn append_pending(&mut self, packages: &[PackageId]) {
        self.pending.extend_from_slice(packages);
    }

    /// The admitted packages in admission order.
    pub fn packages(&self) -> &[PackageId] {
        &self.admitted_order
    }
}
