//! Ordered ERC collections over one constraint universe.

use std::fmt;
use std::sync::Arc;

use crate::constraint::{ConstraintId, ConstraintUniverse};
use crate::erc::{Erc, Mark};
use crate::error::{OtError, Result};
use crate::ranker::Ranker;

/// An ordered multiset of ERCs sharing one constraint universe.
///
/// Collections grow monotonically during learning; search code that needs
/// to try alternatives takes value copies through [`ErcSet::with_added`].
///
/// # Example
///
/// ```
/// use otforge_core::{ConstraintUniverse, Erc, ErcSet, Mark};
///
/// let universe = ConstraintUniverse::builder()
///     .markedness("M1")
///     .faithfulness("F1")
///     .build()
///     .unwrap();
///
/// let mut ercs = ErcSet::new(&universe);
/// ercs.add(Erc::new(&universe, "d1", [Mark::W, Mark::L]).unwrap()).unwrap();
///
/// assert_eq!(ercs.len(), 1);
/// assert_eq!(ercs.with_mark(1, Mark::L).len(), 1);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ErcSet {
    universe: Arc<ConstraintUniverse>,
    ercs: Vec<Erc>,
}

impl ErcSet {
    /// Creates an empty collection over `universe`.
    pub fn new(universe: &Arc<ConstraintUniverse>) -> Self {
        Self {
            universe: Arc::clone(universe),
            ercs: Vec::new(),
        }
    }

    /// Creates a collection from existing ERCs.
    pub fn from_ercs(
        universe: &Arc<ConstraintUniverse>,
        ercs: impl IntoIterator<Item = Erc>,
    ) -> Result<Self> {
        let mut set = Self::new(universe);
        set.extend(ercs)?;
        Ok(set)
    }

    #[inline]
    pub fn universe(&self) -> &Arc<ConstraintUniverse> {
        &self.universe
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ercs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ercs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Erc> {
        self.ercs.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Erc> {
        self.ercs.iter()
    }

    pub fn as_slice(&self) -> &[Erc] {
        &self.ercs
    }

    /// Appends an ERC.
    ///
    /// # Errors
    ///
    /// Returns [`OtError::UniverseMismatch`] if the ERC was built over a
    /// different constraint universe.
    pub fn add(&mut self, erc: Erc) -> Result<()> {
        if !erc.universe().same_as(&self.universe) {
            return Err(OtError::UniverseMismatch);
        }
        self.ercs.push(erc);
        Ok(())
    }

    /// Appends an ERC unless one with identical marks is already present.
    ///
    /// Returns whether the ERC was added.
    pub fn add_unique(&mut self, erc: Erc) -> Result<bool> {
        if self.contains_marks(&erc) {
            if !erc.universe().same_as(&self.universe) {
                return Err(OtError::UniverseMismatch);
            }
            return Ok(false);
        }
        self.add(erc)?;
        Ok(true)
    }

    /// Appends every ERC, stopping at the first universe mismatch.
    pub fn extend(&mut self, ercs: impl IntoIterator<Item = Erc>) -> Result<()> {
        for erc in ercs {
            self.add(erc)?;
        }
        Ok(())
    }

    /// Returns a copy of this collection with `ercs` appended.
    pub fn with_added<'a>(&self, ercs: impl IntoIterator<Item = &'a Erc>) -> Result<Self> {
        let mut copy = self.clone();
        copy.extend(ercs.into_iter().cloned())?;
        Ok(copy)
    }

    /// True if some ERC has exactly the marks of `erc`.
    pub fn contains_marks(&self, erc: &Erc) -> bool {
        self.ercs.iter().any(|e| e.same_marks(erc))
    }

    /// Returns the sub-collection of ERCs matching `predicate`.
    pub fn filter(&self, predicate: impl Fn(&Erc) -> bool) -> Self {
        Self {
            universe: Arc::clone(&self.universe),
            ercs: self.ercs.iter().filter(|e| predicate(e)).cloned().collect(),
        }
    }

    /// Returns the ERCs carrying `mark` on `constraint`.
    pub fn with_mark(&self, constraint: ConstraintId, mark: Mark) -> Self {
        self.filter(|e| e.mark(constraint) == mark)
    }

    /// Fuses every ERC of the collection, or `None` when empty.
    pub fn fusion(&self) -> Option<Erc> {
        let mut iter = self.ercs.iter();
        let first = iter.next()?.clone();
        // Same universe throughout, so fusion cannot fail.
        iter.try_fold(first, |acc, erc| acc.fuse(erc)).ok()
    }

    /// Returns the collection restricted to the given indices, in index order.
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            universe: Arc::clone(&self.universe),
            ercs: indices
                .iter()
                .filter_map(|&i| self.ercs.get(i))
                .cloned()
                .collect(),
        }
    }

    /// True if `ranker` finds a hierarchy satisfying every ERC.
    pub fn is_consistent_with<R: Ranker + ?Sized>(&self, ranker: &R) -> bool {
        ranker.is_consistent(self)
    }

    /// True if every total ranking consistent with this collection satisfies `target`.
    ///
    /// `target` fails under a total order exactly when one of its `L`
    /// constraints dominates all of its `W` constraints, so entailment is
    /// decided by showing each such domination inconsistent with the
    /// collection.
    ///
    /// # Errors
    ///
    /// Returns [`OtError::UniverseMismatch`] if `target` uses another universe.
    pub fn entails_with<R: Ranker + ?Sized>(&self, target: &Erc, ranker: &R) -> Result<bool> {
        if !target.universe().same_as(&self.universe) {
            return Err(OtError::UniverseMismatch);
        }
        if target.is_trivial() || !ranker.is_consistent(self) {
            return Ok(true);
        }

        for loser in target.loser_preferring() {
            let negated_marks = target.marks().iter().enumerate().map(|(id, mark)| {
                if id == loser {
                    Mark::W
                } else if *mark == Mark::W {
                    Mark::L
                } else {
                    Mark::E
                }
            });
            let negation = Erc::new(&self.universe, "negation", negated_marks)?;
            let mut extended = self.clone();
            extended.ercs.push(negation);
            if ranker.is_consistent(&extended) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Returns the smallest sub-collection that entails `target`.
    ///
    /// Subsets are tried by increasing size in index order, so the result
    /// is deterministic. The search is exponential in the collection size
    /// and meant for explanatory output. Returns `None` when the whole
    /// collection does not entail `target`.
    pub fn minimal_support_with<R: Ranker + ?Sized>(
        &self,
        target: &Erc,
        ranker: &R,
    ) -> Result<Option<Self>> {
        if !self.entails_with(target, ranker)? {
            return Ok(None);
        }

        let n = self.ercs.len();
        for size in 0..=n {
            let mut indices: Vec<usize> = (0..size).collect();
            loop {
                let candidate = self.subset(&indices);
                if candidate.entails_with(target, ranker)? {
                    return Ok(Some(candidate));
                }
                if !next_combination(&mut indices, n) {
                    break;
                }
            }
        }
        Ok(Some(self.clone()))
    }
}

// Advances `indices` to the next k-combination of 0..n in lexicographic order.
fn next_combination(indices: &mut [usize], n: usize) -> bool {
    let k = indices.len();
    let mut i = k;
    while i > 0 {
        i -= 1;
        if indices[i] < n - k + i {
            indices[i] += 1;
            for j in i + 1..k {
                indices[j] = indices[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

impl<'a> IntoIterator for &'a ErcSet {
    type Item = &'a Erc;
    type IntoIter = std::slice::Iter<'a, Erc>;

    fn into_iter(self) -> Self::IntoIter {
        self.ercs.iter()
    }
}

impl fmt::Debug for ErcSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ercs.iter()).finish()
    }
}

impl fmt::Display for ErcSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, erc) in self.ercs.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", erc)?;
        }
        Ok(())
    }
}
