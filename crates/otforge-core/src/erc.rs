//! Elementary Ranking Conditions.
//!
//! An ERC records, for every constraint of a universe, whether the
//! constraint prefers the winner (`W`), prefers the loser (`L`) or has no
//! preference (`e`) in one winner/loser comparison.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::competition::Candidate;
use crate::constraint::{ConstraintId, ConstraintUniverse};
use crate::error::{OtError, Result};
use crate::hierarchy::Hierarchy;

/// Inline storage for one mark per constraint.
pub type Marks = SmallVec<[Mark; 16]>;

/// Evaluation mark of one constraint in an ERC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mark {
    /// Prefers the winner.
    W,
    /// Prefers the loser.
    L,
    /// No preference.
    #[default]
    E,
}

impl Mark {
    /// Compares violation counts of a winner and a loser on one constraint.
    pub fn compare(winner_violations: u32, loser_violations: u32) -> Self {
        match winner_violations.cmp(&loser_violations) {
            std::cmp::Ordering::Less => Mark::W,
            std::cmp::Ordering::Greater => Mark::L,
            std::cmp::Ordering::Equal => Mark::E,
        }
    }

    /// Fusion of two marks: `L` absorbs, then `W`, then `e`.
    pub fn fuse(self, other: Mark) -> Mark {
        match (self, other) {
            (Mark::L, _) | (_, Mark::L) => Mark::L,
            (Mark::W, _) | (_, Mark::W) => Mark::W,
            _ => Mark::E,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::W => write!(f, "W"),
            Mark::L => write!(f, "L"),
            Mark::E => write!(f, "e"),
        }
    }
}

/// One ranking datum over a constraint universe.
///
/// # Example
///
/// ```
/// use otforge_core::{ConstraintUniverse, Erc, Mark};
///
/// let universe = ConstraintUniverse::builder()
///     .markedness("M1")
///     .markedness("M2")
///     .faithfulness("F1")
///     .build()
///     .unwrap();
///
/// let erc = Erc::from_named_marks(&universe, "d1", &[("M1", Mark::W), ("M2", Mark::L)]).unwrap();
/// assert_eq!(erc.mark(2), Mark::E);
/// assert_eq!(erc.to_string(), "d1: [W, L, e]");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Erc {
    label: String,
    universe: Arc<ConstraintUniverse>,
    marks: Marks,
}

impl Erc {
    /// Creates an ERC from one mark per constraint, in universe order.
    ///
    /// # Errors
    ///
    /// Returns [`OtError::MarkCountMismatch`] if the number of marks differs
    /// from the universe size.
    pub fn new(
        universe: &Arc<ConstraintUniverse>,
        label: impl Into<String>,
        marks: impl IntoIterator<Item = Mark>,
    ) -> Result<Self> {
        let marks: Marks = marks.into_iter().collect();
        if marks.len() != universe.len() {
            return Err(OtError::MarkCountMismatch {
                expected: universe.len(),
                found: marks.len(),
            });
        }
        Ok(Self {
            label: label.into(),
            universe: Arc::clone(universe),
            marks,
        })
    }

    /// Creates an ERC from named marks; unnamed constraints get `e`.
    ///
    /// # Errors
    ///
    /// Returns [`OtError::UnknownConstraint`] for a name not in the universe.
    pub fn from_named_marks(
        universe: &Arc<ConstraintUniverse>,
        label: impl Into<String>,
        marks: &[(&str, Mark)],
    ) -> Result<Self> {
        let mut all: Marks = SmallVec::from_elem(Mark::E, universe.len());
        for (name, mark) in marks {
            all[universe.require(name)?] = *mark;
        }
        Ok(Self {
            label: label.into(),
            universe: Arc::clone(universe),
            marks: all,
        })
    }

    /// Builds the ERC comparing `winner` against `loser`.
    ///
    /// # Errors
    ///
    /// Returns [`OtError::MarkCountMismatch`] if either violation profile does
    /// not match the universe.
    pub fn from_comparison(
        universe: &Arc<ConstraintUniverse>,
        label: impl Into<String>,
        winner: &Candidate,
        loser: &Candidate,
    ) -> Result<Self> {
        for candidate in [winner, loser] {
            if candidate.violations().len() != universe.len() {
                return Err(OtError::MarkCountMismatch {
                    expected: universe.len(),
                    found: candidate.violations().len(),
                });
            }
        }
        let marks = winner
            .violations()
            .iter()
            .zip(loser.violations())
            .map(|(&w, &l)| Mark::compare(w, l))
            .collect();
        Ok(Self {
            label: label.into(),
            universe: Arc::clone(universe),
            marks,
        })
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn universe(&self) -> &Arc<ConstraintUniverse> {
        &self.universe
    }

    /// Returns all marks in universe order.
    #[inline]
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// Returns the mark on constraint `id` (`e` when out of range).
    #[inline]
    pub fn mark(&self, id: ConstraintId) -> Mark {
        self.marks.get(id).copied().unwrap_or(Mark::E)
    }

    /// Returns a copy of this ERC with a different label.
    pub fn relabeled(&self, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..self.clone()
        }
    }

    /// Constraints marked `W`.
    pub fn winner_preferring(&self) -> impl Iterator<Item = ConstraintId> + '_ {
        self.with(Mark::W)
    }

    /// Constraints marked `L`.
    pub fn loser_preferring(&self) -> impl Iterator<Item = ConstraintId> + '_ {
        self.with(Mark::L)
    }

    fn with(&self, mark: Mark) -> impl Iterator<Item = ConstraintId> + '_ {
        self.marks
            .iter()
            .enumerate()
            .filter(move |(_, m)| **m == mark)
            .map(|(id, _)| id)
    }

    pub fn has_w(&self) -> bool {
        self.marks.contains(&Mark::W)
    }

    pub fn has_l(&self) -> bool {
        self.marks.contains(&Mark::L)
    }

    /// True if every ranking satisfies this ERC (no `L` marks).
    pub fn is_trivial(&self) -> bool {
        !self.has_l()
    }

    /// True if no ranking satisfies this ERC (an `L` with no `W`).
    pub fn is_unsatisfiable(&self) -> bool {
        self.has_l() && !self.has_w()
    }

    /// True if both ERCs carry identical marks, ignoring labels.
    pub fn same_marks(&self, other: &Erc) -> bool {
        self.marks == other.marks
    }

    /// True if `hierarchy` satisfies this ERC.
    pub fn satisfied_by(&self, hierarchy: &Hierarchy) -> bool {
        hierarchy.satisfies(self)
    }

    /// Fuses two ERCs constraint by constraint.
    ///
    /// The fusion is entailed by the pair, which makes it useful for
    /// summarizing the ranking information of a set.
    ///
    /// # Errors
    ///
    /// Returns [`OtError::UniverseMismatch`] if the universes differ.
    pub fn fuse(&self, other: &Erc) -> Result<Erc> {
        if !self.universe.same_as(&other.universe) {
            return Err(OtError::UniverseMismatch);
        }
        Ok(Self {
            label: format!("{} + {}", self.label, other.label),
            universe: Arc::clone(&self.universe),
            marks: self
                .marks
                .iter()
                .zip(&other.marks)
                .map(|(a, b)| a.fuse(*b))
                .collect(),
        })
    }

    /// Renders the marks with constraint names, skipping `e`.
    pub fn describe(&self) -> String {
        let parts: Vec<String> = self
            .marks
            .iter()
            .enumerate()
            .filter(|(_, m)| **m != Mark::E)
            .map(|(id, m)| format!("{}:{}", self.universe.name_of(id), m))
            .collect();
        format!("{} {{{}}}", self.label, parts.join(", "))
    }
}

impl fmt::Debug for Erc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Erc")
            .field("label", &self.label)
            .field("marks", &self.describe())
            .finish()
    }
}

impl fmt::Display for Erc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marks: Vec<String> = self.marks.iter().map(Mark::to_string).collect();
        write!(f, "{}: [{}]", self.label, marks.join(", "))
    }
}

#[cfg(test)]
mod tests;
