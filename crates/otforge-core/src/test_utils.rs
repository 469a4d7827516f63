//! Test utilities for otforge-core
//!
//! Provides common test fixtures used across the crate's test modules.

use std::sync::Arc;

use crate::competition::Candidate;
use crate::constraint::{ConstraintId, ConstraintUniverse};
use crate::erc_set::ErcSet;
use crate::hierarchy::Hierarchy;
use crate::ranker::Ranker;

/// Universe `{M1, M2, F1}`.
pub fn three_constraints() -> Arc<ConstraintUniverse> {
    ConstraintUniverse::builder()
        .markedness("M1")
        .markedness("M2")
        .faithfulness("F1")
        .build()
        .unwrap()
}

/// Creates a candidate from a violation slice.
pub fn candidate(output: &str, violations: &[u32]) -> Candidate {
    Candidate::new(output, violations.iter().copied())
}

/// Decides consistency by trying every total order of the universe.
///
/// Only usable for small universes; the crate's own tests need a ranker
/// without depending on the solver crate.
#[derive(Debug, Default)]
pub struct PermutationRanker;

impl Ranker for PermutationRanker {
    fn is_consistent(&self, ercs: &ErcSet) -> bool {
        let universe = ercs.universe();
        let mut order: Vec<ConstraintId> = (0..universe.len()).collect();
        permutations(&mut order, 0, &mut |perm| {
            Hierarchy::total(universe, perm)
                .map(|h| h.satisfies_all(ercs))
                .unwrap_or(false)
        })
    }
}

// Recursive permutation walk; stops at the first accepted order.
fn permutations(
    items: &mut [ConstraintId],
    k: usize,
    accept: &mut dyn FnMut(&[ConstraintId]) -> bool,
) -> bool {
    if k == items.len() {
        return accept(items);
    }
    for i in k..items.len() {
        items.swap(k, i);
        if permutations(items, k + 1, accept) {
            items.swap(k, i);
            return true;
        }
        items.swap(k, i);
    }
    false
}
