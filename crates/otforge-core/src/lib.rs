//! otforge Core - Core types for Optimality-Theoretic ranking
//!
//! This crate provides the data model shared by the ranking engine:
//! - Constraint universes with typed (markedness/faithfulness) constraints
//! - Elementary Ranking Conditions (ERCs) and ERC collections
//! - Stratified hierarchies and ERC satisfaction
//! - Candidates and competitions with stratum-pooled evaluation
//! - The [`Ranker`] seam implemented by the solver crate

pub mod competition;
pub mod constraint;
pub mod erc;
pub mod erc_set;
pub mod error;
pub mod hierarchy;
pub mod ranker;

#[cfg(test)]
mod test_utils;

pub use competition::{Candidate, Competition};
pub use constraint::{Constraint, ConstraintId, ConstraintKind, ConstraintUniverse, UniverseBuilder};
pub use erc::{Erc, Mark, Marks};
pub use erc_set::ErcSet;
pub use error::{OtError, Result};
pub use hierarchy::Hierarchy;
pub use ranker::Ranker;
