//! Shared test fixtures for otforge crates.
//!
//! This crate provides constraint systems and pure functions for testing.
//! It depends only on `otforge-core`, so the solver crate can use it as a
//! dev-dependency without a cycle.
//!
//! - [`scenario`] - The three-constraint `{M1, M2, F1}` system
//! - [`syllable`] - Onset/NoCoda/Max/Dep syllable-structure competitions
//! - [`random`] - Seeded random ERC sets and competitions
//! - [`oracle`] - Brute-force ranking over every total order
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! otforge-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```
//! use otforge_test::scenario::{scenario_universe, scenario_ercs};
//! use otforge_test::oracle::exists_total_order;
//!
//! let universe = scenario_universe();
//! assert!(exists_total_order(&scenario_ercs(&universe)));
//! ```

pub mod oracle;
pub mod random;
pub mod scenario;
pub mod syllable;

pub use oracle::{exists_total_order, oracle_typology, total_orders};
pub use random::{random_competitions, random_ercs, random_language, random_universe};
pub use scenario::{scenario_ercs, scenario_universe};
pub use syllable::{syllable_competitions, syllable_universe};
