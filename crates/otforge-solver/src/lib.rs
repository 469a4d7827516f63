//! otforge Ranking Engine
//!
//! This crate provides the ranking algorithms over ERC collections:
//! - Recursive Constraint Demotion with pluggable ranking biases
//! - Multi-Recursive Constraint Demotion, the incremental learner
//! - Factorial typology generation with optional parallel branches
//! - Search statistics

pub mod mrcd;
pub mod rcd;
pub mod stats;
pub mod typology;

pub use mrcd::{
    FailureReason, Grammar, LearningFailure, Mismatch, Mrcd, MrcdOutcome, MrcdState, PassRecord,
};
pub use rcd::{
    BiasContext, BiasPolicy, ConstraintsLow, ErcSetRanking, FaithfulnessLow, Inconsistency,
    MarkednessLow, RankingBias, RankingOutcome, Rcd, Unbiased,
};
pub use stats::TypologyStats;
pub use typology::{FactorialTypology, Language, Typology, TypologyNode, Winner};
