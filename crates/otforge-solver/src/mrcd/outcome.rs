//! Learner results and pass records.

use std::fmt;

use otforge_config::{CollectionMode, MismatchRule};
use otforge_core::{Competition, ErcSet, Hierarchy, Result};

use super::collect;

/// A datum whose observed winner the current hierarchy does not derive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Input of the competition.
    pub input: String,
    /// Output of the observed winner.
    pub observed: String,
    /// Outputs of the predicted optima the winner was compared against.
    pub predicted: Vec<String>,
}

/// One collect/rank pass of the learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassRecord {
    /// 1-based pass number.
    pub pass: usize,
    /// Data that did not match the prediction.
    pub mismatches: Vec<Mismatch>,
    /// ERCs added to the collection by this pass.
    pub new_ercs: usize,
    /// Hierarchy in force once the pass finished.
    pub hierarchy: Hierarchy,
}

impl PassRecord {
    /// True if the pass found no mismatch.
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// A learned grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub(super) hierarchy: Hierarchy,
    pub(super) ercs: ErcSet,
    pub(super) trace: Vec<PassRecord>,
    pub(super) data: Vec<Competition>,
    pub(super) mismatch: MismatchRule,
}

impl Grammar {
    /// The final hierarchy.
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Every ERC collected while learning.
    pub fn ercs(&self) -> &ErcSet {
        &self.ercs
    }

    /// One record per pass, the converging pass last.
    pub fn trace(&self) -> &[PassRecord] {
        &self.trace
    }

    /// Number of collecting passes, including the converging one.
    pub fn passes(&self) -> usize {
        self.trace.len()
    }

    /// The learning data.
    pub fn data(&self) -> &[Competition] {
        &self.data
    }

    pub fn into_hierarchy(self) -> Hierarchy {
        self.hierarchy
    }

    /// Runs one more collecting pass over the learning data.
    ///
    /// The grammar is not modified. For a converged grammar the record has
    /// no mismatches and no new ERCs.
    pub fn recheck(&self) -> Result<PassRecord> {
        let collected = collect(
            &self.data,
            &self.hierarchy,
            &self.ercs,
            self.mismatch,
            CollectionMode::FullPass,
        )?;
        Ok(PassRecord {
            pass: self.trace.len() + 1,
            new_ercs: collected.fresh.len(),
            mismatches: collected.mismatches,
            hierarchy: self.hierarchy.clone(),
        })
    }
}

/// Why learning stopped without a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The collected ERCs admit no ranking.
    Inconsistent {
        /// ERCs RCD could not satisfy.
        residue: ErcSet,
        /// Input of the datum whose ERCs entered the residue.
        offending_input: String,
        /// Observed winner of that datum.
        offending_winner: String,
    },
    /// The configured pass limit was reached before convergence.
    PassLimitExceeded {
        passes: usize,
    },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Inconsistent {
                residue,
                offending_input,
                offending_winner,
            } => write!(
                f,
                "no ranking derives '{}' for {} ({} conflicting ERCs)",
                offending_winner,
                offending_input,
                residue.len()
            ),
            FailureReason::PassLimitExceeded { passes } => {
                write!(f, "no convergence after {} passes", passes)
            }
        }
    }
}

/// Diagnostics for data the learner could not rank.
#[derive(Debug, Clone)]
pub struct LearningFailure {
    /// What went wrong.
    pub reason: FailureReason,
    /// Strata built before ranking got stuck, or the last hierarchy when the
    /// pass limit was hit.
    pub partial: Hierarchy,
    /// Every ERC collected, including the conflicting ones.
    pub ercs: ErcSet,
    /// One record per pass, the failing pass last.
    pub trace: Vec<PassRecord>,
}

/// Terminal result of a learning run.
#[derive(Debug, Clone)]
pub enum MrcdOutcome {
    Converged(Grammar),
    Failed(LearningFailure),
}

impl MrcdOutcome {
    #[inline]
    pub fn is_converged(&self) -> bool {
        matches!(self, MrcdOutcome::Converged(_))
    }

    pub fn grammar(&self) -> Option<&Grammar> {
        match self {
            MrcdOutcome::Converged(g) => Some(g),
            MrcdOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&LearningFailure> {
        match self {
            MrcdOutcome::Converged(_) => None,
            MrcdOutcome::Failed(f) => Some(f),
        }
    }

    /// The pass records, whichever way the run ended.
    pub fn trace(&self) -> &[PassRecord] {
        match self {
            MrcdOutcome::Converged(g) => &g.trace,
            MrcdOutcome::Failed(f) => &f.trace,
        }
    }
}
