//! Candidates and competitions.
//!
//! A competition is the candidate set generated for one input. Candidate
//! generation belongs to the linguistic layer; this module only holds the
//! violation profiles and evaluates them under a hierarchy.

use std::cmp::Ordering;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::constraint::{ConstraintId, ConstraintUniverse};
use crate::erc::{Erc, Mark};
use crate::erc_set::ErcSet;
use crate::error::{OtError, Result};
use crate::hierarchy::Hierarchy;

/// One output candidate with its violation profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    output: String,
    violations: SmallVec<[u32; 16]>,
}

impl Candidate {
    /// Creates a candidate with one violation count per constraint.
    pub fn new(output: impl Into<String>, violations: impl IntoIterator<Item = u32>) -> Self {
        Self {
            output: output.into(),
            violations: violations.into_iter().collect(),
        }
    }

    #[inline]
    pub fn output(&self) -> &str {
        &self.output
    }

    #[inline]
    pub fn violations(&self) -> &[u32] {
        &self.violations
    }

    /// Violations of constraint `id` (0 when out of range).
    pub fn violations_of(&self, id: ConstraintId) -> u32 {
        self.violations.get(id).copied().unwrap_or(0)
    }

    /// True if both candidates incur identical violations.
    pub fn same_profile(&self, other: &Candidate) -> bool {
        self.violations == other.violations
    }
}

/// The candidate set for one input, optionally with a designated winner.
///
/// # Example
///
/// ```
/// use otforge_core::{Candidate, Competition, ConstraintUniverse, Hierarchy};
///
/// let universe = ConstraintUniverse::builder()
///     .markedness("NoCoda")
///     .faithfulness("Max")
///     .build()
///     .unwrap();
///
/// let competition = Competition::new(
///     &universe,
///     "/pat/",
///     vec![Candidate::new("pat", [1, 0]), Candidate::new("pa", [0, 1])],
/// )
/// .unwrap();
///
/// let faithful = Hierarchy::total(&universe, &[1, 0]).unwrap();
/// assert_eq!(competition.optima(&faithful), vec![0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Competition {
    input: String,
    universe: Arc<ConstraintUniverse>,
    candidates: Vec<Candidate>,
    winner: Option<usize>,
}

impl Competition {
    /// Creates a competition.
    ///
    /// # Errors
    ///
    /// Returns [`OtError::EmptyCompetition`] when `candidates` is empty and
    /// [`OtError::MarkCountMismatch`] when a violation profile does not
    /// cover the universe.
    pub fn new(
        universe: &Arc<ConstraintUniverse>,
        input: impl Into<String>,
        candidates: Vec<Candidate>,
    ) -> Result<Self> {
        let input = input.into();
        if candidates.is_empty() {
            return Err(OtError::EmptyCompetition(input));
        }
        if let Some(bad) = candidates
            .iter()
            .find(|c| c.violations.len() != universe.len())
        {
            return Err(OtError::MarkCountMismatch {
                expected: universe.len(),
                found: bad.violations.len(),
            });
        }
        Ok(Self {
            input,
            universe: Arc::clone(universe),
            candidates,
            winner: None,
        })
    }

    /// Designates the candidate at `index` as the observed winner.
    pub fn with_winner(mut self, index: usize) -> Result<Self> {
        if index >= self.candidates.len() {
            return Err(OtError::WinnerOutOfRange {
                input: self.input,
                index,
                len: self.candidates.len(),
            });
        }
        self.winner = Some(index);
        Ok(self)
    }

    /// Designates the candidate with output `output` as the observed winner.
    pub fn with_winner_output(self, output: &str) -> Result<Self> {
        match self.candidates.iter().position(|c| c.output == output) {
            Some(index) => self.with_winner(index),
            None => Err(OtError::UnknownCandidate {
                input: self.input,
                output: output.to_string(),
            }),
        }
    }

    #[inline]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[inline]
    pub fn universe(&self) -> &Arc<ConstraintUniverse> {
        &self.universe
    }

    #[inline]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Always false: competitions hold at least one candidate.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Index of the designated winner, if any.
    #[inline]
    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    pub fn winner_candidate(&self) -> Option<&Candidate> {
        self.winner.and_then(|i| self.candidates.get(i))
    }

    /// Indices of the optimal candidates under `hierarchy`.
    ///
    /// Violations are pooled within each stratum and strata are compared
    /// from the top down; constraints the hierarchy leaves unplaced form one
    /// final pooled stratum. Ties return several indices.
    pub fn optima(&self, hierarchy: &Hierarchy) -> Vec<usize> {
        let unplaced = hierarchy.unplaced();
        let pooled: Vec<Vec<u64>> = self
            .candidates
            .iter()
            .map(|c| {
                hierarchy
                    .strata()
                    .iter()
                    .map(Vec::as_slice)
                    .chain(std::iter::once(unplaced.as_slice()))
                    .map(|stratum| stratum.iter().map(|&id| c.violations_of(id) as u64).sum())
                    .collect()
            })
            .collect();

        let mut best: Vec<usize> = Vec::new();
        for (i, profile) in pooled.iter().enumerate() {
            match best.first().map(|&b| profile.cmp(&pooled[b])) {
                None | Some(Ordering::Equal) => best.push(i),
                Some(Ordering::Less) => best = vec![i],
                Some(Ordering::Greater) => {}
            }
        }
        best
    }

    /// The ERC of candidate `winner` against candidate `loser`.
    pub fn erc_between(&self, winner: usize, loser: usize) -> Result<Erc> {
        let (w, l) = (self.checked(winner)?, self.checked(loser)?);
        Erc::from_comparison(
            &self.universe,
            format!("{}: {} > {}", self.input, w.output, l.output),
            w,
            l,
        )
    }

    /// ERCs of candidate `winner` against every candidate with a different profile.
    ///
    /// Candidates sharing the winner's profile yield all-`e` ERCs and are skipped.
    pub fn ercs_for(&self, winner: usize) -> Result<ErcSet> {
        let w = self.checked(winner)?;
        let mut ercs = ErcSet::new(&self.universe);
        for (loser, candidate) in self.candidates.iter().enumerate() {
            if loser == winner || candidate.same_profile(w) {
                continue;
            }
            ercs.add(self.erc_between(winner, loser)?)?;
        }
        Ok(ercs)
    }

    /// Candidates simply harmonically bounded by another candidate.
    ///
    /// A candidate is bounded when some other candidate incurs no more
    /// violations on any constraint and strictly fewer on at least one; no
    /// ranking can make it optimal.
    pub fn harmonically_bounded(&self) -> Vec<usize> {
        (0..self.candidates.len())
            .filter(|&i| self.is_bounded(i))
            .collect()
    }

    /// Candidates that are not simply harmonically bounded.
    pub fn contenders(&self) -> Vec<usize> {
        (0..self.candidates.len())
            .filter(|&i| !self.is_bounded(i))
            .collect()
    }

    fn is_bounded(&self, index: usize) -> bool {
        let me = &self.candidates[index];
        self.candidates.iter().enumerate().any(|(j, other)| {
            j != index && {
                let marks = me
                    .violations
                    .iter()
                    .zip(&other.violations)
                    .map(|(&a, &b)| Mark::compare(a, b));
                let (mut w, mut l) = (false, false);
                for mark in marks {
                    match mark {
                        Mark::W => w = true,
                        Mark::L => l = true,
                        Mark::E => {}
                    }
                }
                l && !w
            }
        })
    }

    fn checked(&self, index: usize) -> Result<&Candidate> {
        self.candidates
            .get(index)
            .ok_or_else(|| OtError::WinnerOutOfRange {
                input: self.input.clone(),
                index,
                len: self.candidates.len(),
            })
    }
}

#[cfg(test)]
mod tests;
