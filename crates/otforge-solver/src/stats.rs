//! Typology search statistics.
//!
//! Plain counters owned by one search branch; parallel branches each keep
//! their own and are merged after the join.

use std::time::{Duration, Instant};

/// Counters for one factorial typology run.
///
/// # Example
///
/// ```
/// use otforge_solver::stats::TypologyStats;
///
/// let mut stats = TypologyStats::default();
/// stats.record_node();
/// stats.record_node();
/// stats.record_prune();
///
/// assert_eq!(stats.nodes_explored, 2);
/// assert_eq!(stats.branches_pruned, 1);
/// assert!((stats.prune_rate() - 0.5).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypologyStats {
    /// Search nodes whose ERC collection was ranked.
    pub nodes_explored: u64,
    /// Nodes abandoned because their ERC collection was inconsistent.
    pub branches_pruned: u64,
    /// Candidates removed up front as simply harmonically bounded.
    pub bounded_candidates: u64,
    /// Languages reached twice and collapsed into one.
    pub duplicates_collapsed: u64,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

impl TypologyStats {
    /// Records a ranked node.
    pub fn record_node(&mut self) {
        self.nodes_explored += 1;
    }

    /// Records a pruned branch.
    pub fn record_prune(&mut self) {
        self.branches_pruned += 1;
    }

    /// Adds the counters of another branch.
    pub fn merge(&mut self, other: &TypologyStats) {
        self.nodes_explored += other.nodes_explored;
        self.branches_pruned += other.branches_pruned;
        self.bounded_candidates += other.bounded_candidates;
        self.duplicates_collapsed += other.duplicates_collapsed;
    }

    /// Sets `elapsed` from a start instant.
    pub fn finish(&mut self, start: Instant) {
        self.elapsed = start.elapsed();
    }

    /// Returns the elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }

    /// Fraction of explored nodes that were pruned.
    pub fn prune_rate(&self) -> f64 {
        if self.nodes_explored == 0 {
            0.0
        } else {
            self.branches_pruned as f64 / self.nodes_explored as f64
        }
    }

    /// Returns the nodes per second rate.
    pub fn nodes_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.nodes_explored as f64 / secs
        } else {
            0.0
        }
    }
}
