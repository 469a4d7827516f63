//! Typology search node.
//!
//! Each node is a partial winner assignment: one chosen candidate for each
//! of the first `depth` competitions, with the ERCs those choices imply.

use otforge_core::ErcSet;

/// A node in the typology search tree.
///
/// Nodes own their ERC collection by value. A child copies its parent's
/// collection and appends the ERCs of its new winner, so sibling branches
/// never observe each other's choices.
#[derive(Debug, Clone)]
pub struct TypologyNode {
    /// Number of competitions with a chosen winner.
    depth: usize,

    /// ERCs implied by the chosen winners.
    ercs: ErcSet,

    /// Chosen candidate index per decided competition.
    winners: Vec<usize>,
}

impl TypologyNode {
    /// Creates the root node with no decisions.
    pub fn root(ercs: ErcSet) -> Self {
        Self {
            depth: 0,
            ercs,
            winners: Vec::new(),
        }
    }

    /// Creates the child choosing `candidate` for the next competition.
    ///
    /// `ercs` is the parent's collection with the new winner's ERCs appended.
    pub fn child(&self, candidate: usize, ercs: ErcSet) -> Self {
        let mut winners = Vec::with_capacity(self.winners.len() + 1);
        winners.extend_from_slice(&self.winners);
        winners.push(candidate);
        Self {
            depth: self.depth + 1,
            ercs,
            winners,
        }
    }

    /// Returns the depth of this node.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn ercs(&self) -> &ErcSet {
        &self.ercs
    }

    #[inline]
    pub fn winners(&self) -> &[usize] {
        &self.winners
    }

    /// Returns true if every competition has a winner.
    #[inline]
    pub fn is_leaf(&self, total_competitions: usize) -> bool {
        self.depth >= total_competitions
    }

    pub(crate) fn into_parts(self) -> (ErcSet, Vec<usize>) {
        (self.ercs, self.winners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otforge_core::{Erc, Mark};
    use otforge_test::scenario::scenario_universe;

    #[test]
    fn test_root_node() {
        let universe = scenario_universe();
        let root = TypologyNode::root(ErcSet::new(&universe));

        assert_eq!(root.depth(), 0);
        assert!(root.winners().is_empty());
        assert!(root.is_leaf(0));
        assert!(!root.is_leaf(2));
    }

    #[test]
    fn test_child_copies_parent_state() {
        let universe = scenario_universe();
        let root = TypologyNode::root(ErcSet::new(&universe));

        let erc = Erc::new(&universe, "x", [Mark::W, Mark::L, Mark::E]).unwrap();
        let child = root.child(2, root.ercs().with_added([&erc]).unwrap());
        let grandchild = child.child(0, child.ercs().clone());

        assert!(root.ercs().is_empty());
        assert_eq!(child.depth(), 1);
        assert_eq!(child.winners(), &[2]);
        assert_eq!(grandchild.winners(), &[2, 0]);
        assert_eq!(grandchild.ercs().len(), 1);
        assert!(grandchild.is_leaf(2));
    }
}
