//! Bias policies for Recursive Constraint Demotion.
//!
//! When several constraints can be placed in the current stratum, a bias
//! decides which of them are placed now and which are deferred to a later
//! round. Any non-empty subset of the rankable constraints is safe to
//! place, so a bias changes the shape of the hierarchy but never the
//! consistent/inconsistent verdict.

use std::fmt::Debug;

use otforge_config::BiasConfig;
use otforge_core::{ConstraintId, ConstraintKind, ConstraintUniverse, Erc, Mark, Result};

/// State of an RCD round, as seen by a bias.
#[derive(Debug, Clone, Copy)]
pub struct BiasContext<'a> {
    /// The constraint universe being ranked.
    pub universe: &'a ConstraintUniverse,
    /// ERCs not yet satisfied by a placed constraint.
    pub active: &'a [&'a Erc],
    /// Constraints not yet placed, in id order.
    pub unplaced: &'a [ConstraintId],
}

impl BiasContext<'_> {
    /// True if some active ERC marks `constraint` with `W`.
    pub fn prefers_winner(&self, constraint: ConstraintId) -> bool {
        self.active.iter().any(|e| e.mark(constraint) == Mark::W)
    }

    /// Unplaced constraints of the given kind.
    pub fn unplaced_of(&self, kind: ConstraintKind) -> Vec<ConstraintId> {
        self.unplaced
            .iter()
            .copied()
            .filter(|&c| self.universe.kind_of(c) == Some(kind))
            .collect()
    }

    /// True if placing `subset` makes some unplaced constraint of `kind`
    /// outside `subset` rankable in the next round.
    pub fn frees(&self, subset: &[ConstraintId], kind: ConstraintKind) -> bool {
        let remaining: Vec<&Erc> = self
            .active
            .iter()
            .copied()
            .filter(|e| !subset.iter().any(|&c| e.mark(c) == Mark::W))
            .collect();
        self.unplaced_of(kind)
            .into_iter()
            .filter(|c| !subset.contains(c))
            .any(|c| remaining.iter().all(|e| e.mark(c) != Mark::L))
    }
}

/// Tie-break strategy consulted by RCD once per round.
///
/// `select` receives the rankable constraints (unplaced, no `L` in any
/// active ERC) in id order and returns the subset to place now. Returning
/// an empty set or constraints outside `rankable` makes RCD fall back to
/// placing every rankable constraint.
pub trait RankingBias: Send + Sync + Debug {
    /// Chooses the constraints placed in the current stratum.
    fn select(&self, rankable: &[ConstraintId], ctx: &BiasContext<'_>) -> Vec<ConstraintId>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Classic RCD: every rankable constraint goes as high as possible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unbiased;

impl RankingBias for Unbiased {
    fn select(&self, rankable: &[ConstraintId], _ctx: &BiasContext<'_>) -> Vec<ConstraintId> {
        rankable.to_vec()
    }

    fn name(&self) -> &'static str {
        "unbiased"
    }
}

/// Biased Constraint Demotion: faithfulness as low as possible.
///
/// Tie-break, in order:
/// 1. Rankable markedness constraints are placed, all of them.
/// 2. With no markedness rankable and none left unplaced, every rankable
///    constraint is placed.
/// 3. Otherwise the smallest set of active faithfulness constraints (those
///    with a `W` in an active ERC) that frees a markedness constraint is
///    placed; sets of equal size are tried in constraint-id order.
/// 4. If no set frees markedness, all active faithfulness constraints are
///    placed; if none is active, every rankable constraint is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaithfulnessLow;

impl RankingBias for FaithfulnessLow {
    fn select(&self, rankable: &[ConstraintId], ctx: &BiasContext<'_>) -> Vec<ConstraintId> {
        defer_kind(rankable, ctx, ConstraintKind::Faithfulness)
    }

    fn name(&self) -> &'static str {
        "faithfulness_low"
    }
}

/// Mirror of [`FaithfulnessLow`]: markedness as low as possible.
///
/// Same tie-break with the roles of the two kinds swapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkednessLow;

impl RankingBias for MarkednessLow {
    fn select(&self, rankable: &[ConstraintId], ctx: &BiasContext<'_>) -> Vec<ConstraintId> {
        defer_kind(rankable, ctx, ConstraintKind::Markedness)
    }

    fn name(&self) -> &'static str {
        "markedness_low"
    }
}

fn defer_kind(
    rankable: &[ConstraintId],
    ctx: &BiasContext<'_>,
    low: ConstraintKind,
) -> Vec<ConstraintId> {
    let high = low.opposite();
    let is = |c: &ConstraintId, kind| ctx.universe.kind_of(*c) == Some(kind);

    let high_rankable: Vec<ConstraintId> = rankable.iter().copied().filter(|c| is(c, high)).collect();
    if !high_rankable.is_empty() {
        return high_rankable;
    }
    if ctx.unplaced_of(high).is_empty() {
        return rankable.to_vec();
    }

    let active_low: Vec<ConstraintId> = rankable
        .iter()
        .copied()
        .filter(|&c| is(&c, low) && ctx.prefers_winner(c))
        .collect();
    if active_low.is_empty() {
        return rankable.to_vec();
    }

    for size in 1..=active_low.len() {
        if let Some(subset) = first_freeing_subset(&active_low, size, ctx, high) {
            return subset;
        }
    }
    active_low
}

// Smallest-first search over `size`-subsets of `pool`, in lexicographic order.
fn first_freeing_subset(
    pool: &[ConstraintId],
    size: usize,
    ctx: &BiasContext<'_>,
    kind: ConstraintKind,
) -> Option<Vec<ConstraintId>> {
    let n = pool.len();
    let mut idx: Vec<usize> = (0..size).collect();
    loop {
        let subset: Vec<ConstraintId> = idx.iter().map(|&i| pool[i]).collect();
        if ctx.frees(&subset, kind) {
            return Some(subset);
        }

        let mut i = size;
        loop {
            if i == 0 {
                return None;
            }
            i -= 1;
            if idx[i] < n - size + i {
                break;
            }
        }
        idx[i] += 1;
        for j in i + 1..size {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

/// Defers a fixed set of constraints for as long as anything else is rankable.
///
/// Tie-break: rankable constraints outside the set are placed, all of them;
/// members of the set are placed only in rounds where nothing else is
/// rankable, and then all rankable members together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintsLow {
    low: Vec<ConstraintId>,
}

impl ConstraintsLow {
    /// Creates the bias from constraint ids.
    pub fn new(low: impl IntoIterator<Item = ConstraintId>) -> Self {
        let mut low: Vec<ConstraintId> = low.into_iter().collect();
        low.sort_unstable();
        low.dedup();
        Self { low }
    }

    /// Creates the bias from constraint names.
    ///
    /// # Errors
    ///
    /// Returns `UnknownConstraint` for a name not in `universe`.
    pub fn from_names<S: AsRef<str>>(universe: &ConstraintUniverse, names: &[S]) -> Result<Self> {
        let ids = names
            .iter()
            .map(|n| universe.require(n.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(ids))
    }

    /// The deferred constraint ids.
    pub fn low(&self) -> &[ConstraintId] {
        &self.low
    }
}

impl RankingBias for ConstraintsLow {
    fn select(&self, rankable: &[ConstraintId], _ctx: &BiasContext<'_>) -> Vec<ConstraintId> {
        let preferred: Vec<ConstraintId> = rankable
            .iter()
            .copied()
            .filter(|c| self.low.binary_search(c).is_err())
            .collect();
        if preferred.is_empty() {
            rankable.to_vec()
        } else {
            preferred
        }
    }

    fn name(&self) -> &'static str {
        "constraints_low"
    }
}

/// Any of the built-in bias policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BiasPolicy {
    Unbiased(Unbiased),
    FaithfulnessLow(FaithfulnessLow),
    MarkednessLow(MarkednessLow),
    ConstraintsLow(ConstraintsLow),
}

impl BiasPolicy {
    /// Builds the policy named by `config`, resolving constraint names.
    ///
    /// # Errors
    ///
    /// Returns `UnknownConstraint` if a `constraints_low` name is not in `universe`.
    pub fn from_config(config: &BiasConfig, universe: &ConstraintUniverse) -> Result<Self> {
        Ok(match config {
            BiasConfig::Unbiased => BiasPolicy::Unbiased(Unbiased),
            BiasConfig::FaithfulnessLow => BiasPolicy::FaithfulnessLow(FaithfulnessLow),
            BiasConfig::MarkednessLow => BiasPolicy::MarkednessLow(MarkednessLow),
            BiasConfig::ConstraintsLow { constraints } => {
                BiasPolicy::ConstraintsLow(ConstraintsLow::from_names(universe, constraints.as_slice())?)
            }
        })
    }
}

impl Default for BiasPolicy {
    fn default() -> Self {
        BiasPolicy::Unbiased(Unbiased)
    }
}

impl RankingBias for BiasPolicy {
    fn select(&self, rankable: &[ConstraintId], ctx: &BiasContext<'_>) -> Vec<ConstraintId> {
        match self {
            BiasPolicy::Unbiased(b) => b.select(rankable, ctx),
            BiasPolicy::FaithfulnessLow(b) => b.select(rankable, ctx),
            BiasPolicy::MarkednessLow(b) => b.select(rankable, ctx),
            BiasPolicy::ConstraintsLow(b) => b.select(rankable, ctx),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            BiasPolicy::Unbiased(b) => b.name(),
            BiasPolicy::FaithfulnessLow(b) => b.name(),
            BiasPolicy::MarkednessLow(b) => b.name(),
            BiasPolicy::ConstraintsLow(b) => b.name(),
        }
    }
}

impl<B: RankingBias + ?Sized> RankingBias for &B {
    fn select(&self, rankable: &[ConstraintId], ctx: &BiasContext<'_>) -> Vec<ConstraintId> {
        (**self).select(rankable, ctx)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<B: RankingBias + ?Sized> RankingBias for Box<B> {
    fn select(&self, rankable: &[ConstraintId], ctx: &BiasContext<'_>) -> Vec<ConstraintId> {
        (**self).select(rankable, ctx)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
