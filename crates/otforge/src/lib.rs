//! otforge - Optimality-Theoretic ranking inference in Rust
//!
//! Zero-wiring API: describe the constraints and competitions, then call
//! [`learn`] or [`factorial_typology`]. Both read `otforge.toml` from the
//! working directory when present.
//!
//! # Example
//!
//! ```rust
//! use otforge::prelude::*;
//!
//! let universe = ConstraintUniverse::builder()
//!     .markedness("NoCoda")
//!     .faithfulness("Max")
//!     .build()
//!     .unwrap();
//!
//! let competitions = vec![Competition::new(
//!     &universe,
//!     "/pat/",
//!     vec![Candidate::new("pat", [1, 0]), Candidate::new("pa", [0, 1])],
//! )
//! .unwrap()];
//!
//! let typology = otforge::factorial_typology(&universe, competitions).unwrap();
//! assert_eq!(typology.len(), 2);
//! ```

// Core model
pub use otforge_core::{
    Candidate, Competition, Constraint, ConstraintId, ConstraintKind, ConstraintUniverse, Erc,
    ErcSet, Hierarchy, Mark, OtError, Ranker, Result, UniverseBuilder,
};

// Configuration
pub use otforge_config::{
    BiasConfig, CollectionMode, ConfigError, LearnerConfig, MismatchRule, OtConfig, ThreadCount,
    TypologyConfig,
};

// Ranking engine
pub use otforge_solver::{
    BiasPolicy, ConstraintsLow, ErcSetRanking, FactorialTypology, FailureReason,
    FaithfulnessLow, Grammar, Inconsistency, Language, LearningFailure, MarkednessLow, Mrcd,
    MrcdOutcome, MrcdState, RankingBias, RankingOutcome, Rcd, Typology, TypologyStats, Unbiased,
    Winner,
};

#[cfg(feature = "console")]
pub use otforge_console as console;

mod engine;
pub use engine::{
    factorial_typology, factorial_typology_with_config, learn, learn_with_config, CONFIG_FILE,
};

pub mod prelude {
    pub use super::{
        Candidate, Competition, ConstraintKind, ConstraintUniverse, Erc, ErcSet, Hierarchy, Mark,
    };
    pub use super::{ErcSetRanking, MrcdOutcome, RankingOutcome, Rcd, Typology};
    pub use super::{LearnerConfig, OtConfig, TypologyConfig};
}
