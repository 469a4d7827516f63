//! Stratified constraint hierarchies.

use std::fmt;
use std::sync::Arc;

use crate::constraint::{ConstraintId, ConstraintUniverse};
use crate::erc::{Erc, Mark};
use crate::erc_set::ErcSet;
use crate::error::{OtError, Result};

/// A total preorder over constraints: strata ordered from highest to lowest.
///
/// Constraints in one stratum are tied. Each stratum is kept sorted by
/// constraint id so that equal hierarchies compare equal.
///
/// # Example
///
/// ```
/// use otforge_core::{ConstraintUniverse, Hierarchy};
///
/// let universe = ConstraintUniverse::builder()
///     .markedness("M1")
///     .markedness("M2")
///     .faithfulness("F1")
///     .build()
///     .unwrap();
///
/// let h = Hierarchy::new(&universe, vec![vec![0], vec![2, 1]]).unwrap();
/// assert_eq!(h.to_string(), "{M1} >> {M2, F1}");
/// assert!(h.dominates(0, 2));
/// assert!(!h.dominates(1, 2));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Hierarchy {
    universe: Arc<ConstraintUniverse>,
    strata: Vec<Vec<ConstraintId>>,
    // Stratum index per constraint; `None` while unplaced.
    stratum_index: Vec<Option<usize>>,
}

impl Hierarchy {
    /// Creates a complete hierarchy.
    ///
    /// # Errors
    ///
    /// Returns [`OtError::DuplicateInHierarchy`] if a constraint is placed
    /// twice and [`OtError::IncompleteHierarchy`] if one is missing.
    pub fn new(universe: &Arc<ConstraintUniverse>, strata: Vec<Vec<ConstraintId>>) -> Result<Self> {
        let hierarchy = Self::partial(universe, strata)?;
        if let Some(missing) = hierarchy.unplaced().first() {
            return Err(OtError::IncompleteHierarchy(
                universe.name_of(*missing).to_string(),
            ));
        }
        Ok(hierarchy)
    }

    /// Creates a hierarchy that may leave constraints unplaced.
    ///
    /// Used for the partial result of an inconsistent ranking. Empty strata
    /// are dropped.
    pub fn partial(
        universe: &Arc<ConstraintUniverse>,
        strata: Vec<Vec<ConstraintId>>,
    ) -> Result<Self> {
        let mut stratum_index = vec![None; universe.len()];
        let mut kept = Vec::with_capacity(strata.len());
        for mut stratum in strata.into_iter().filter(|s| !s.is_empty()) {
            stratum.sort_unstable();
            for &id in &stratum {
                let slot = stratum_index
                    .get_mut(id)
                    .ok_or_else(|| OtError::UnknownConstraint(format!("#{}", id)))?;
                if slot.is_some() {
                    return Err(OtError::DuplicateInHierarchy(
                        universe.name_of(id).to_string(),
                    ));
                }
                *slot = Some(kept.len());
            }
            kept.push(stratum);
        }
        Ok(Self {
            universe: Arc::clone(universe),
            strata: kept,
            stratum_index,
        })
    }

    /// Builds a hierarchy from strata produced round by round by a ranking
    /// algorithm.
    ///
    /// Ids outside the universe and repeated placements are skipped, so this
    /// never fails; unplaced constraints stay unplaced.
    pub fn from_rounds(universe: &Arc<ConstraintUniverse>, strata: Vec<Vec<ConstraintId>>) -> Self {
        let mut stratum_index = vec![None; universe.len()];
        let mut kept = Vec::with_capacity(strata.len());
        for stratum in strata {
            let mut placed: Vec<ConstraintId> = stratum
                .into_iter()
                .filter(|&id| matches!(stratum_index.get(id), Some(None)))
                .collect();
            placed.sort_unstable();
            placed.dedup();
            if placed.is_empty() {
                continue;
            }
            for &id in &placed {
                stratum_index[id] = Some(kept.len());
            }
            kept.push(placed);
        }
        Self {
            universe: Arc::clone(universe),
            strata: kept,
            stratum_index,
        }
    }

    /// The hierarchy with every constraint tied in one stratum.
    pub fn unranked(universe: &Arc<ConstraintUniverse>) -> Self {
        let all: Vec<ConstraintId> = (0..universe.len()).collect();
        let strata = if all.is_empty() { Vec::new() } else { vec![all] };
        Self {
            universe: Arc::clone(universe),
            stratum_index: vec![Some(0); universe.len()],
            strata,
        }
    }

    /// Creates a total order from constraint ids listed highest first.
    pub fn total(universe: &Arc<ConstraintUniverse>, order: &[ConstraintId]) -> Result<Self> {
        Self::new(universe, order.iter().map(|&id| vec![id]).collect())
    }

    #[inline]
    pub fn universe(&self) -> &Arc<ConstraintUniverse> {
        &self.universe
    }

    /// Returns the strata from highest to lowest.
    #[inline]
    pub fn strata(&self) -> &[Vec<ConstraintId>] {
        &self.strata
    }

    /// Returns the number of strata.
    #[inline]
    pub fn len(&self) -> usize {
        self.strata.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strata.is_empty()
    }

    /// Returns the stratum index of `id` (0 is highest).
    pub fn stratum_of(&self, id: ConstraintId) -> Option<usize> {
        self.stratum_index.get(id).copied().flatten()
    }

    /// True if `a` sits in a strictly higher stratum than `b`.
    ///
    /// Unplaced constraints are dominated by every placed one.
    pub fn dominates(&self, a: ConstraintId, b: ConstraintId) -> bool {
        match (self.stratum_of(a), self.stratum_of(b)) {
            (Some(sa), Some(sb)) => sa < sb,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// Constraints not placed in any stratum, in id order.
    pub fn unplaced(&self) -> Vec<ConstraintId> {
        self.stratum_index
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// True if every constraint of the universe is placed.
    pub fn is_complete(&self) -> bool {
        self.stratum_index.iter().all(Option::is_some)
    }

    /// True if the hierarchy is complete and has no ties.
    pub fn is_total(&self) -> bool {
        self.is_complete() && self.strata.iter().all(|s| s.len() == 1)
    }

    /// True if every `L` of `erc` is dominated by some `W` of `erc`.
    ///
    /// Equivalently, the highest stratum holding a non-`e` mark holds a `W`
    /// and no `L`. ERCs without `L` marks are always satisfied; ERCs from
    /// another universe never are.
    pub fn satisfies(&self, erc: &Erc) -> bool {
        if !erc.universe().same_as(&self.universe) {
            return false;
        }
        let rank = |id: ConstraintId| self.stratum_of(id).unwrap_or(usize::MAX);

        let top = erc
            .marks()
            .iter()
            .enumerate()
            .filter(|(_, m)| **m != Mark::E)
            .map(|(id, _)| rank(id))
            .min();
        let Some(top) = top else {
            return true;
        };

        let mut has_w = false;
        for (id, mark) in erc.marks().iter().enumerate() {
            if rank(id) != top {
                continue;
            }
            match mark {
                Mark::L => return false,
                Mark::W => has_w = true,
                Mark::E => {}
            }
        }
        has_w
    }

    /// True if every ERC of `ercs` is satisfied.
    pub fn satisfies_all(&self, ercs: &ErcSet) -> bool {
        ercs.iter().all(|erc| self.satisfies(erc))
    }

    /// Returns the strata as constraint names.
    pub fn stratum_names(&self) -> Vec<Vec<&str>> {
        self.strata
            .iter()
            .map(|s| s.iter().map(|&id| self.universe.name_of(id)).collect())
            .collect()
    }
}

impl fmt::Debug for Hierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hierarchy({})", self)
    }
}

impl fmt::Display for Hierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stratum) in self.stratum_names().iter().enumerate() {
            if i > 0 {
                write!(f, " >> ")?;
            }
            write!(f, "{{{}}}", stratum.join(", "))?;
        }
        Ok(())
    }
}
