//! Error types for otforge

use thiserror::Error;

/// Main error type for malformed engine input.
///
/// Ranking inconsistency and learning failure are not errors; they are
/// reported as structured outcomes by the solver crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OtError {
    /// Two constraints in one universe share a name.
    #[error("Duplicate constraint name: {0}")]
    DuplicateConstraint(String),

    /// A constraint name or id does not exist in the universe.
    #[error("Unknown constraint: {0}")]
    UnknownConstraint(String),

    /// Two values built over different constraint universes were combined.
    #[error("Constraint universe mismatch")]
    UniverseMismatch,

    /// A mark or violation vector does not cover the universe exactly.
    #[error("Expected {expected} entries (one per constraint), found {found}")]
    MarkCountMismatch { expected: usize, found: usize },

    /// A competition was built with no candidates.
    #[error("Competition for input '{0}' has no candidates")]
    EmptyCompetition(String),

    /// A winner index points past the candidate list.
    #[error("Winner index {index} out of range for input '{input}' ({len} candidates)")]
    WinnerOutOfRange {
        input: String,
        index: usize,
        len: usize,
    },

    /// A winner was named by an output that no candidate has.
    #[error("No candidate '{output}' for input '{input}'")]
    UnknownCandidate { input: String, output: String },

    /// Learning data contains a competition without a designated winner.
    #[error("Competition for input '{0}' has no designated winner")]
    MissingWinner(String),

    /// A complete hierarchy is missing a constraint.
    #[error("Constraint '{0}' missing from hierarchy")]
    IncompleteHierarchy(String),

    /// A constraint was placed in more than one stratum.
    #[error("Constraint '{0}' appears in more than one stratum")]
    DuplicateInHierarchy(String),
}

/// Result type alias for otforge operations
pub type Result<T> = std::result::Result<T, OtError>;
