//! Multi-Recursive Constraint Demotion.
//!
//! MRCD learns a hierarchy from competitions with observed winners. Each
//! pass predicts the optima of every competition under the current
//! hierarchy; every datum whose observed winner is not derived contributes
//! ERCs comparing the winner against the predicted optima. The enlarged
//! collection is re-ranked with RCD, and the cycle repeats until a pass
//! finds no mismatch or RCD reports the data unrankable.
//!
//! Every mismatch ERC is violated by the hierarchy that produced it, while
//! RCD's hierarchies satisfy every collected ERC, so each ranking pass adds
//! at least one ERC not seen before and learning terminates.

mod outcome;

use std::fmt;
use std::sync::Arc;

use otforge_config::{CollectionMode, LearnerConfig, MismatchRule};
use otforge_core::{Competition, ConstraintUniverse, Erc, ErcSet, Hierarchy, OtError, Result};
use tracing::{debug, info};

use crate::rcd::{BiasPolicy, Rcd, RankingBias, RankingOutcome};

pub use outcome::{FailureReason, Grammar, LearningFailure, Mismatch, MrcdOutcome, PassRecord};

/// Learner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MrcdState {
    /// Next step compares predictions with the data.
    Collecting,
    /// Next step re-ranks the enlarged ERC collection.
    Ranking,
    /// A pass found no mismatch.
    Converged,
    /// The data admits no ranking, or the pass limit was hit.
    Failed,
}

impl MrcdState {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, MrcdState::Converged | MrcdState::Failed)
    }
}

impl fmt::Display for MrcdState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MrcdState::Collecting => write!(f, "Collecting"),
            MrcdState::Ranking => write!(f, "Ranking"),
            MrcdState::Converged => write!(f, "Converged"),
            MrcdState::Failed => write!(f, "Failed"),
        }
    }
}

/// Result of one collecting pass.
#[derive(Debug, Default)]
pub(crate) struct Collected {
    pub(crate) mismatches: Vec<Mismatch>,
    /// New ERCs, each tagged with the index of its mismatch.
    pub(crate) fresh: Vec<(usize, Erc)>,
}

/// Compares predictions under `hierarchy` with the observed winners.
///
/// ERCs whose marks are already in `known`, or were produced earlier in
/// the same pass, are not repeated.
pub(crate) fn collect(
    data: &[Competition],
    hierarchy: &Hierarchy,
    known: &ErcSet,
    rule: MismatchRule,
    mode: CollectionMode,
) -> Result<Collected> {
    let mut collected = Collected::default();

    for competition in data {
        let Some(winner) = competition.winner() else {
            continue;
        };
        let optima = competition.optima(hierarchy);
        let rivals: Vec<usize> = match rule {
            MismatchRule::Lenient if optima.contains(&winner) => Vec::new(),
            MismatchRule::Lenient => optima,
            MismatchRule::Strict => {
                let observed = &competition.candidates()[winner];
                optima
                    .into_iter()
                    .filter(|&o| !competition.candidates()[o].same_profile(observed))
                    .collect()
            }
        };
        if rivals.is_empty() {
            continue;
        }

        let index = collected.mismatches.len();
        for &rival in &rivals {
            let erc = competition.erc_between(winner, rival)?;
            let repeated = known.contains_marks(&erc)
                || collected.fresh.iter().any(|(_, e)| e.same_marks(&erc));
            if !repeated {
                collected.fresh.push((index, erc));
            }
        }
        collected.mismatches.push(Mismatch {
            input: competition.input().to_string(),
            observed: competition.candidates()[winner].output().to_string(),
            predicted: rivals
                .iter()
                .map(|&r| competition.candidates()[r].output().to_string())
                .collect(),
        });

        if mode == CollectionMode::FirstError {
            break;
        }
    }
    Ok(collected)
}

/// Collected but not yet ranked.
#[derive(Debug)]
struct PendingPass {
    pass: usize,
    collected: Collected,
}

/// The incremental learner.
///
/// # Example
///
/// ```
/// use otforge_config::{LearnerConfig, MismatchRule};
/// use otforge_core::{Candidate, Competition, ConstraintUniverse};
/// use otforge_solver::mrcd::Mrcd;
/// use otforge_solver::rcd::Unbiased;
///
/// let universe = ConstraintUniverse::builder()
///     .markedness("NoCoda")
///     .faithfulness("Max")
///     .build()
///     .unwrap();
///
/// let data = vec![Competition::new(
///     &universe,
///     "/pat/",
///     vec![Candidate::new("pat", [1, 0]), Candidate::new("pa", [0, 1])],
/// )
/// .unwrap()
/// .with_winner_output("pa")
/// .unwrap()];
///
/// let config = LearnerConfig {
///     mismatch: MismatchRule::Strict,
///     ..LearnerConfig::default()
/// };
/// let outcome = Mrcd::new(&universe, data, Unbiased, config)
///     .unwrap()
///     .run()
///     .unwrap();
///
/// let grammar = outcome.grammar().unwrap();
/// assert_eq!(grammar.hierarchy().to_string(), "{NoCoda} >> {Max}");
/// ```
#[derive(Debug)]
pub struct Mrcd<B = BiasPolicy> {
    universe: Arc<ConstraintUniverse>,
    data: Vec<Competition>,
    rcd: Rcd<B>,
    config: LearnerConfig,
    state: MrcdState,
    hierarchy: Hierarchy,
    ercs: ErcSet,
    trace: Vec<PassRecord>,
    pending: Option<PendingPass>,
    failure: Option<(FailureReason, Hierarchy)>,
}

impl<B: RankingBias> Mrcd<B> {
    /// Creates a learner in the `Collecting` state.
    ///
    /// The initial hierarchy is RCD over no ERCs under `bias`.
    ///
    /// # Errors
    ///
    /// Returns [`OtError::UniverseMismatch`] if a competition uses another
    /// universe and [`OtError::MissingWinner`] if one has no winner.
    pub fn new(
        universe: &Arc<ConstraintUniverse>,
        data: Vec<Competition>,
        bias: B,
        config: LearnerConfig,
    ) -> Result<Self> {
        for competition in &data {
            if !competition.universe().same_as(universe) {
                return Err(OtError::UniverseMismatch);
            }
            if competition.winner().is_none() {
                return Err(OtError::MissingWinner(competition.input().to_string()));
            }
        }

        let rcd = Rcd::new(bias);
        let ercs = ErcSet::new(universe);
        let hierarchy = rcd
            .rank(&ercs)
            .into_hierarchy()
            .unwrap_or_else(|| Hierarchy::unranked(universe));

        Ok(Self {
            universe: Arc::clone(universe),
            data,
            rcd,
            config,
            state: MrcdState::Collecting,
            hierarchy,
            ercs,
            trace: Vec::new(),
            pending: None,
            failure: None,
        })
    }

    #[inline]
    pub fn state(&self) -> MrcdState {
        self.state
    }

    /// The hierarchy currently used for prediction.
    #[inline]
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// ERCs collected so far.
    #[inline]
    pub fn ercs(&self) -> &ErcSet {
        &self.ercs
    }

    /// Records of the finished passes.
    #[inline]
    pub fn trace(&self) -> &[PassRecord] {
        &self.trace
    }

    #[inline]
    pub fn universe(&self) -> &Arc<ConstraintUniverse> {
        &self.universe
    }

    /// Performs one state transition and returns the new state.
    ///
    /// Terminal states are left unchanged.
    pub fn step(&mut self) -> Result<MrcdState> {
        match self.state {
            MrcdState::Collecting => self.collect_step()?,
            MrcdState::Ranking => self.rank_step(),
            MrcdState::Converged | MrcdState::Failed => {}
        }
        Ok(self.state)
    }

    /// Steps until a terminal state and returns the outcome.
    pub fn run(mut self) -> Result<MrcdOutcome> {
        info!(
            event = "learn_start",
            competitions = self.data.len() as u64,
            constraints = self.universe.len() as u64,
            bias = self.rcd.bias().name(),
        );

        while !self.state.is_terminal() {
            self.step()?;
        }

        info!(
            event = "learn_end",
            converged = self.state == MrcdState::Converged,
            passes = self.trace.len() as u64,
            ercs = self.ercs.len() as u64,
        );
        Ok(self.into_outcome())
    }

    fn collect_step(&mut self) -> Result<()> {
        if self.trace.len() >= self.config.max_passes {
            self.fail(
                FailureReason::PassLimitExceeded {
                    passes: self.trace.len(),
                },
                self.hierarchy.clone(),
            );
            return Ok(());
        }

        let pass = self.trace.len() + 1;
        let collected = collect(
            &self.data,
            &self.hierarchy,
            &self.ercs,
            self.config.mismatch,
            self.config.collection,
        )?;
        debug!(
            event = "pass",
            pass = pass as u64,
            mismatches = collected.mismatches.len() as u64,
            new_ercs = collected.fresh.len() as u64,
        );

        if collected.mismatches.is_empty() {
            self.trace.push(PassRecord {
                pass,
                mismatches: Vec::new(),
                new_ercs: 0,
                hierarchy: self.hierarchy.clone(),
            });
            self.state = MrcdState::Converged;
            return Ok(());
        }

        self.ercs
            .extend(collected.fresh.iter().map(|(_, erc)| erc.clone()))?;
        self.pending = Some(PendingPass { pass, collected });
        self.state = MrcdState::Ranking;
        Ok(())
    }

    fn rank_step(&mut self) {
        let Some(PendingPass { pass, collected }) = self.pending.take() else {
            self.state = MrcdState::Collecting;
            return;
        };

        match self.rcd.rank(&self.ercs) {
            RankingOutcome::Consistent(hierarchy) => {
                self.hierarchy = hierarchy;
                self.trace.push(PassRecord {
                    pass,
                    new_ercs: collected.fresh.len(),
                    mismatches: collected.mismatches,
                    hierarchy: self.hierarchy.clone(),
                });
                self.state = MrcdState::Collecting;
            }
            RankingOutcome::Inconsistent(inconsistency) => {
                let culprit = collected
                    .fresh
                    .iter()
                    .find(|(_, erc)| inconsistency.residue.contains_marks(erc))
                    .map(|(index, _)| *index)
                    .unwrap_or(collected.mismatches.len().saturating_sub(1));
                let (offending_input, offending_winner) = collected
                    .mismatches
                    .get(culprit)
                    .map(|m| (m.input.clone(), m.observed.clone()))
                    .unwrap_or_default();

                self.trace.push(PassRecord {
                    pass,
                    new_ercs: collected.fresh.len(),
                    mismatches: collected.mismatches,
                    hierarchy: self.hierarchy.clone(),
                });
                self.fail(
                    FailureReason::Inconsistent {
                        residue: inconsistency.residue,
                        offending_input,
                        offending_winner,
                    },
                    inconsistency.partial,
                );
            }
        }
    }

    fn fail(&mut self, reason: FailureReason, partial: Hierarchy) {
        debug!(event = "learn_failed", reason = %reason);
        self.failure = Some((reason, partial));
        self.state = MrcdState::Failed;
    }

    fn into_outcome(self) -> MrcdOutcome {
        match self.failure {
            Some((reason, partial)) => MrcdOutcome::Failed(LearningFailure {
                reason,
                partial,
                ercs: self.ercs,
                trace: self.trace,
            }),
            None => MrcdOutcome::Converged(Grammar {
                hierarchy: self.hierarchy,
                ercs: self.ercs,
                trace: self.trace,
                data: self.data,
                mismatch: self.config.mismatch,
            }),
        }
    }
}
