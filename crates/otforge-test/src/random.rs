//! Seeded random instances for property tests.
//!
//! Every generator takes an explicit seed and uses `ChaCha8Rng`, so a
//! failing case can be reproduced from its seed alone.

use std::sync::Arc;

use otforge_core::{
    Candidate, Competition, ConstraintId, ConstraintKind, ConstraintUniverse, Erc, ErcSet,
    Hierarchy, Mark,
};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Universe `C0..C{n-1}`; even ids are markedness, odd ids faithfulness.
pub fn random_universe(n_constraints: usize) -> Arc<ConstraintUniverse> {
    let mut builder = ConstraintUniverse::builder();
    for i in 0..n_constraints {
        let kind = if i % 2 == 0 {
            ConstraintKind::Markedness
        } else {
            ConstraintKind::Faithfulness
        };
        builder = builder.constraint(format!("C{}", i), kind);
    }
    builder.build().expect("generated names are unique")
}

/// `n_ercs` random ERCs over [`random_universe`].
///
/// Each mark is `e` with probability 1/2 and `W` or `L` with 1/4 each, which
/// yields a healthy mix of consistent and inconsistent collections for
/// three or four constraints.
pub fn random_ercs(seed: u64, n_constraints: usize, n_ercs: usize) -> ErcSet {
    let universe = random_universe(n_constraints);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let ercs = (0..n_ercs).map(|i| {
        let marks: Vec<Mark> = (0..n_constraints)
            .map(|_| match rng.random_range(0..4) {
                0 => Mark::W,
                1 => Mark::L,
                _ => Mark::E,
            })
            .collect();
        Erc::new(&universe, format!("r{}", i), marks).expect("one mark per constraint")
    });
    ErcSet::from_ercs(&universe, ercs.collect::<Vec<_>>()).expect("same universe")
}

/// Random competitions with pairwise distinct violation profiles.
///
/// Violation counts range over `0..=max_violations`; profiles that repeat
/// an earlier candidate are redrawn, so `n_candidates` must not exceed the
/// number of distinct profiles.
pub fn random_competitions(
    seed: u64,
    universe: &Arc<ConstraintUniverse>,
    n_competitions: usize,
    n_candidates: usize,
    max_violations: u32,
) -> Vec<Competition> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n_competitions)
        .map(|c| {
            let mut profiles: Vec<Vec<u32>> = Vec::with_capacity(n_candidates);
            while profiles.len() < n_candidates {
                let profile: Vec<u32> = (0..universe.len())
                    .map(|_| rng.random_range(0..=max_violations))
                    .collect();
                if !profiles.contains(&profile) {
                    profiles.push(profile);
                }
            }
            let candidates = profiles
                .into_iter()
                .enumerate()
                .map(|(k, p)| Candidate::new(format!("i{}o{}", c, k), p))
                .collect();
            Competition::new(universe, format!("/i{}/", c), candidates)
                .expect("profiles cover the universe")
        })
        .collect()
}

/// Learnable data: random competitions whose winners are the optima of a
/// hidden random total order.
///
/// Returns the competitions and the hidden order, highest first.
pub fn random_language(
    seed: u64,
    universe: &Arc<ConstraintUniverse>,
    n_competitions: usize,
    n_candidates: usize,
) -> (Vec<Competition>, Vec<ConstraintId>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0x5eed);
    let mut order: Vec<ConstraintId> = (0..universe.len()).collect();
    order.shuffle(&mut rng);
    let hidden = Hierarchy::total(universe, &order).expect("permutation of the universe");

    let data = random_competitions(seed, universe, n_competitions, n_candidates, 2)
        .into_iter()
        .map(|c| {
            let winner = c.optima(&hidden)[0];
            c.with_winner(winner).expect("optimum is a candidate")
        })
        .collect();
    (data, order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ercs_is_reproducible() {
        let a = random_ercs(7, 4, 5);
        let b = random_ercs(7, 4, 5);
        assert_eq!(a.len(), 5);
        let marks = |s: &ErcSet| s.iter().map(|e| e.marks().to_vec()).collect::<Vec<_>>();
        assert_eq!(marks(&a), marks(&b));
    }

    #[test]
    fn test_random_competitions_have_distinct_profiles() {
        let universe = random_universe(3);
        for competition in random_competitions(3, &universe, 4, 5, 2) {
            let c = competition.candidates();
            for i in 0..c.len() {
                for j in i + 1..c.len() {
                    assert!(!c[i].same_profile(&c[j]));
                }
            }
        }
    }

    #[test]
    fn test_random_language_winners_are_optimal() {
        let universe = random_universe(4);
        let (data, order) = random_language(11, &universe, 5, 4);
        let hidden = Hierarchy::total(&universe, &order).unwrap();
        for competition in &data {
            let winner = competition.winner().unwrap();
            assert_eq!(competition.optima(&hidden), vec![winner]);
        }
    }
}
