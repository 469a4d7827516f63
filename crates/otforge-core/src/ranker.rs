//! Seam between ERC collections and ranking algorithms.

use crate::erc_set::ErcSet;

/// A ranking algorithm able to decide consistency of an ERC collection.
///
/// Implemented by RCD in `otforge-solver`. Collection queries such as
/// [`ErcSet::entails_with`] are written against this trait so that the
/// ranking logic lives in one place.
pub trait Ranker {
    /// Returns true if some stratified hierarchy satisfies every ERC in `ercs`.
    fn is_consistent(&self, ercs: &ErcSet) -> bool;
}

impl<R: Ranker + ?Sized> Ranker for &R {
    fn is_consistent(&self, ercs: &ErcSet) -> bool {
        (**self).is_consistent(ercs)
    }
}
