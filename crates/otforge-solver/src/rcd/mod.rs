//! Recursive Constraint Demotion.
//!
//! RCD builds a stratified hierarchy from an ERC collection one stratum per
//! round, from the top down:
//!
//! 1. A constraint is *rankable* when no active ERC marks it `L`.
//! 2. The bias picks a non-empty subset of the rankable constraints; they
//!    become the next stratum.
//! 3. Every active ERC with a `W` on a placed constraint is satisfied and
//!    leaves the active set.
//!
//! If nothing is rankable while ERCs remain active, the collection is
//! inconsistent and the active ERCs are reported as the residue. At least
//! one constraint is placed per round, so RCD stops after at most `n`
//! rounds for `n` constraints.

pub mod bias;

use otforge_core::{ConstraintId, Erc, ErcSet, Hierarchy, Mark, Ranker, Result};
use tracing::{debug, trace, warn};

pub use bias::{
    BiasContext, BiasPolicy, ConstraintsLow, FaithfulnessLow, MarkednessLow, RankingBias,
    Unbiased,
};

/// Result of one RCD run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankingOutcome {
    /// Every ERC is satisfied by the hierarchy.
    Consistent(Hierarchy),
    /// No stratified hierarchy satisfies the collection.
    Inconsistent(Inconsistency),
}

impl RankingOutcome {
    #[inline]
    pub fn is_consistent(&self) -> bool {
        matches!(self, RankingOutcome::Consistent(_))
    }

    /// The hierarchy, when consistent.
    pub fn hierarchy(&self) -> Option<&Hierarchy> {
        match self {
            RankingOutcome::Consistent(h) => Some(h),
            RankingOutcome::Inconsistent(_) => None,
        }
    }

    pub fn into_hierarchy(self) -> Option<Hierarchy> {
        match self {
            RankingOutcome::Consistent(h) => Some(h),
            RankingOutcome::Inconsistent(_) => None,
        }
    }

    /// The inconsistency report, when inconsistent.
    pub fn inconsistency(&self) -> Option<&Inconsistency> {
        match self {
            RankingOutcome::Consistent(_) => None,
            RankingOutcome::Inconsistent(i) => Some(i),
        }
    }
}

/// Diagnostic for an inconsistent ERC collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inconsistency {
    /// Strata built before ranking got stuck.
    pub partial: Hierarchy,
    /// ERCs still active when no constraint could be placed.
    pub residue: ErcSet,
    /// Constraints left unplaced, in id order.
    pub unranked: Vec<ConstraintId>,
    /// The (1-based) round in which ranking got stuck.
    pub round: usize,
}

/// Recursive Constraint Demotion with a pluggable bias.
///
/// # Example
///
/// ```
/// use otforge_core::{ConstraintUniverse, Erc, ErcSet, Mark};
/// use otforge_solver::rcd::Rcd;
///
/// let universe = ConstraintUniverse::builder()
///     .markedness("M1")
///     .markedness("M2")
///     .faithfulness("F1")
///     .build()
///     .unwrap();
///
/// let ercs = ErcSet::from_ercs(&universe, [
///     Erc::new(&universe, "d1", [Mark::W, Mark::L, Mark::E]).unwrap(),
///     Erc::new(&universe, "d2", [Mark::E, Mark::W, Mark::L]).unwrap(),
/// ]).unwrap();
///
/// let hierarchy = Rcd::unbiased().rank(&ercs).into_hierarchy().unwrap();
/// assert_eq!(hierarchy.to_string(), "{M1} >> {M2} >> {F1}");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Rcd<B = BiasPolicy> {
    bias: B,
}

impl Rcd<Unbiased> {
    /// Classic, unbiased RCD.
    pub fn unbiased() -> Self {
        Self { bias: Unbiased }
    }
}

impl<B: RankingBias> Rcd<B> {
    /// Creates RCD with the given bias.
    pub fn new(bias: B) -> Self {
        Self { bias }
    }

    #[inline]
    pub fn bias(&self) -> &B {
        &self.bias
    }

    /// Ranks the constraints of `ercs`' universe.
    pub fn rank(&self, ercs: &ErcSet) -> RankingOutcome {
        let outcome = self.demote(ercs);
        match &outcome {
            RankingOutcome::Consistent(h) => debug!(
                event = "rcd",
                bias = self.bias.name(),
                ercs = ercs.len() as u64,
                rounds = h.len() as u64,
                consistent = true,
            ),
            RankingOutcome::Inconsistent(i) => debug!(
                event = "rcd",
                bias = self.bias.name(),
                ercs = ercs.len() as u64,
                rounds = i.round as u64,
                consistent = false,
            ),
        }
        outcome
    }

    fn demote(&self, ercs: &ErcSet) -> RankingOutcome {
        let universe = ercs.universe();
        let n = universe.len();

        // An L without any W can never be satisfied: fail before round 1.
        let hopeless = ercs.filter(Erc::is_unsatisfiable);
        if !hopeless.is_empty() {
            trace!(
                event = "rcd_inconsistent",
                round = 1u64,
                residue = hopeless.len() as u64,
            );
            return RankingOutcome::Inconsistent(Inconsistency {
                partial: Hierarchy::from_rounds(universe, Vec::new()),
                residue: hopeless,
                unranked: (0..n).collect(),
                round: 1,
            });
        }

        let mut placed = vec![false; n];
        let mut active: Vec<&Erc> = ercs.iter().filter(|e| !e.is_trivial()).collect();
        let mut strata: Vec<Vec<ConstraintId>> = Vec::new();

        while placed.iter().any(|p| !p) {
            let round = strata.len() + 1;
            let unplaced: Vec<ConstraintId> = (0..n).filter(|&c| !placed[c]).collect();
            let rankable: Vec<ConstraintId> = unplaced
                .iter()
                .copied()
                .filter(|&c| active.iter().all(|e| e.mark(c) != Mark::L))
                .collect();

            if rankable.is_empty() {
                trace!(
                    event = "rcd_inconsistent",
                    round = round as u64,
                    residue = active.len() as u64,
                );
                let residue = ErcSet::from_ercs(universe, active.iter().map(|e| (*e).clone()))
                    .unwrap_or_else(|_| ErcSet::new(universe));
                return RankingOutcome::Inconsistent(Inconsistency {
                    partial: Hierarchy::from_rounds(universe, strata),
                    residue,
                    unranked: unplaced,
                    round,
                });
            }

            let ctx = BiasContext {
                universe,
                active: &active,
                unplaced: &unplaced,
            };
            let mut chosen = self.bias.select(&rankable, &ctx);
            chosen.sort_unstable();
            chosen.dedup();
            if chosen.is_empty() || chosen.iter().any(|c| rankable.binary_search(c).is_err()) {
                warn!(
                    bias = self.bias.name(),
                    round = round as u64,
                    "bias returned an invalid stratum; placing all rankable constraints"
                );
                chosen = rankable;
            }

            for &c in &chosen {
                placed[c] = true;
            }
            active.retain(|e| !chosen.iter().any(|&c| e.mark(c) == Mark::W));

            trace!(
                event = "rcd_stratum",
                round = round as u64,
                size = chosen.len() as u64,
                remaining = active.len() as u64,
            );
            strata.push(chosen);
        }

        RankingOutcome::Consistent(Hierarchy::from_rounds(universe, strata))
    }
}

impl<B: RankingBias> Ranker for Rcd<B> {
    fn is_consistent(&self, ercs: &ErcSet) -> bool {
        self.rank(ercs).is_consistent()
    }
}

/// Collection queries answered with unbiased RCD.
///
/// Bias never changes consistency, so these need no policy.
pub trait ErcSetRanking {
    /// True if some stratified hierarchy satisfies every ERC.
    fn is_consistent(&self) -> bool;

    /// True if every ranking consistent with the collection satisfies `target`.
    fn entails(&self, target: &Erc) -> Result<bool>;

    /// Smallest sub-collection entailing `target`.
    fn minimal_support(&self, target: &Erc) -> Result<Option<ErcSet>>;
}

impl ErcSetRanking for ErcSet {
    fn is_consistent(&self) -> bool {
        self.is_consistent_with(&Rcd::unbiased())
    }

    fn entails(&self, target: &Erc) -> Result<bool> {
        self.entails_with(target, &Rcd::unbiased())
    }

    fn minimal_support(&self, target: &Erc) -> Result<Option<ErcSet>> {
        self.minimal_support_with(target, &Rcd::unbiased())
    }
}

#[cfg(test)]
mod tests;
