use indexmap::IndexMap;

use crate::graph::{DependencyGraph, PackageId, TypeId};

use super::stack_item::StackItem;

/// Expands traversal states into their child states.
///
/// Borrows the graph for the duration of one expansion; it holds no state
/// of its own.
pub struct Expander<'a> {
    graph: &'a DependencyGraph,
}

impl<'a> Expander<'a> {
    pub fn new(graph: &'a DependencyGraph) -> Self {
        Self { graph }
    }

    /// Produce the child states of `item`.
    ///
    /// A final state comes back unchanged for the caller to emit. A state
    /// whose next pending package is already admitted also comes back
    /// unchanged: the package is settled and its type is necessarily
    /// occupied, which is what makes diamonds and cycles terminate. A state
    /// whose next pending package clashes with an occupied type is dropped
    /// and the returned list is empty.
    ///
    /// Otherwise the package is admitted and one child is produced per way
    /// of satisfying its requirements at the type level. The last child
    /// reuses `item` instead of cloning it; with the common two-alternative
    /// split that halves the allocations.
    pub fn expand_one(&self, mut item: StackItem) -> Vec<StackItem> {
        let Some(package) = item.pop_pending() else {
            return vec![item];
        };
        let package_type = self.graph.type_of(package);

        if item.contains(package) {
            // Already settled on an earlier path through the graph.
            return vec![item];
        }
        if item.has_type(package_type) {
            // A sibling of the same type is already in the stack.
            return Vec::new();
        }
        item.admit(package, package_type);

        let requirements = self.graph.deps_of(package);
        if requirements.is_empty() {
            return vec![item];
        }

        let alternatives = self.alternatives(requirements);
        let mut children = Vec::with_capacity(alternatives.len());
        if let Some((last, rest)) = alternatives.split_last() {
            for tuple in rest {
                let mut child = item.clone();
                child.append_pending(tuple);
                children.push(child);
            }
            item.append_pending(last);
            children.push(item);
        }
        children
    }

    /// All ways of satisfying `requirements` at the type level.
    ///
    /// The requirements are grouped by type, keeping the order types are
    /// first seen in, and the cartesian product across the groups picks
    /// exactly one package per type per tuple. The same rule seeds the
    /// initial frontier from the direct dependencies.
    pub fn alternatives(&self, requirements: &[PackageId]) -> Vec<Vec<PackageId>> {
        let mut groups: IndexMap<TypeId, Vec<PackageId>> = IndexMap::new();
        for &dep in requirements {
            groups.entry(self.graph.type_of(dep)).or_default().push(dep);
        }
        let groups: Vec<Vec<PackageId>> = groups.into_values().collect();
        cartesian_product(&groups)
    }
}

/// Cartesian product of `groups`, one element per group per tuple.
///
/// Tuple `n` decodes `n` in mixed radix with the last group as the least
/// significant digit, so each tuple lists its packages from the last group
/// back to the first. This numbering fixes the order stacks are produced
/// in; changing it changes the byte stream.
fn cartesian_product(groups: &[Vec<PackageId>]) -> Vec<Vec<PackageId>> {
    let total: u128 = groups.iter().map(|g| g.len() as u128).product();
    let mut tuples = Vec::with_capacity(total as usize);
    for n in 0..total {
        let mut tuple = Vec::with_capacity(groups.len());
        let mut quotient = n;
        for group in groups.iter().rev() {
            let remainder = (quotient % group.len() as u128) as usize;
            quotient /= group.len() as u128;
            tuple.push(group[remainder]);
        }
        tuples.push(tuple);
    }
    tuples
}
