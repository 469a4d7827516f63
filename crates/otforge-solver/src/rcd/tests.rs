//! Tests for Recursive Constraint Demotion and its bias policies.

use std::sync::Arc;

use otforge_config::BiasConfig;
use otforge_core::{ConstraintUniverse, Erc, ErcSet, Mark, OtError};
use otforge_test::oracle::exists_total_order;
use otforge_test::random::random_ercs;
use otforge_test::scenario::{erc, scenario_ercs, scenario_universe};

use super::*;

fn named(universe: &Arc<ConstraintUniverse>, label: &str, marks: &[(&str, Mark)]) -> Erc {
    Erc::from_named_marks(universe, label, marks).unwrap()
}

fn four_constraints() -> Arc<ConstraintUniverse> {
    ConstraintUniverse::builder()
        .markedness("M1")
        .markedness("M2")
        .faithfulness("F1")
        .faithfulness("F2")
        .build()
        .unwrap()
}

fn all_policies(universe: &ConstraintUniverse) -> Vec<BiasPolicy> {
    vec![
        BiasPolicy::Unbiased(Unbiased),
        BiasPolicy::FaithfulnessLow(FaithfulnessLow),
        BiasPolicy::MarkednessLow(MarkednessLow),
        BiasPolicy::ConstraintsLow(ConstraintsLow::from_names(universe, &["C0"]).unwrap()),
    ]
}

#[test]
fn test_scenario_ranks_chain() {
    let universe = scenario_universe();
    let ercs = scenario_ercs(&universe);

    let outcome = Rcd::unbiased().rank(&ercs);
    let hierarchy = outcome.hierarchy().unwrap();

    assert_eq!(hierarchy.stratum_names(), vec![vec!["M1"], vec!["M2"], vec!["F1"]]);
    assert!(hierarchy.satisfies_all(&ercs));
}

#[test]
fn test_unsatisfiable_erc_fails_on_round_one() {
    let universe = scenario_universe();
    let mut ercs = scenario_ercs(&universe);
    ercs.add(erc(&universe, "bad", [Mark::L, Mark::E, Mark::E])).unwrap();

    let outcome = Rcd::unbiased().rank(&ercs);
    let inconsistency = outcome.inconsistency().unwrap();

    assert_eq!(inconsistency.round, 1);
    assert_eq!(inconsistency.residue.len(), 1);
    assert_eq!(inconsistency.residue.get(0).unwrap().label(), "bad");
    assert!(inconsistency.partial.is_empty());
    assert_eq!(inconsistency.unranked, vec![0, 1, 2]);
}

#[test]
fn test_cycle_reports_residue_and_partial() {
    let universe = scenario_universe();
    let ercs = ErcSet::from_ercs(
        &universe,
        [
            erc(&universe, "a", [Mark::W, Mark::L, Mark::E]),
            erc(&universe, "b", [Mark::L, Mark::W, Mark::E]),
        ],
    )
    .unwrap();

    let outcome = Rcd::unbiased().rank(&ercs);
    assert!(!outcome.is_consistent());

    let inconsistency = outcome.inconsistency().unwrap();
    assert_eq!(inconsistency.round, 2);
    assert_eq!(inconsistency.partial.to_string(), "{F1}");
    assert_eq!(inconsistency.residue.len(), 2);
    assert_eq!(inconsistency.unranked, vec![0, 1]);
}

#[test]
fn test_empty_collection() {
    let universe = scenario_universe();
    let empty = ErcSet::new(&universe);

    let unbiased = Rcd::unbiased().rank(&empty).into_hierarchy().unwrap();
    assert_eq!(unbiased.to_string(), "{M1, M2, F1}");

    let bcd = Rcd::new(FaithfulnessLow).rank(&empty).into_hierarchy().unwrap();
    assert_eq!(bcd.to_string(), "{M1, M2} >> {F1}");

    let mlow = Rcd::new(MarkednessLow).rank(&empty).into_hierarchy().unwrap();
    assert_eq!(mlow.to_string(), "{F1} >> {M1, M2}");
}

#[test]
fn test_trivial_ercs_are_ignored() {
    let universe = scenario_universe();
    let ercs = ErcSet::from_ercs(
        &universe,
        [
            erc(&universe, "all-e", [Mark::E, Mark::E, Mark::E]),
            erc(&universe, "no-l", [Mark::E, Mark::E, Mark::W]),
        ],
    )
    .unwrap();

    let hierarchy = Rcd::unbiased().rank(&ercs).into_hierarchy().unwrap();
    assert_eq!(hierarchy.len(), 1);
}

#[test]
fn test_faithfulness_low_places_smallest_freeing_set() {
    let universe = four_constraints();
    let ercs = ErcSet::from_ercs(
        &universe,
        [
            named(&universe, "e1", &[("M1", Mark::L), ("F1", Mark::W)]),
            named(&universe, "e2", &[("M2", Mark::L), ("F1", Mark::W), ("F2", Mark::W)]),
        ],
    )
    .unwrap();

    let bcd = Rcd::new(FaithfulnessLow).rank(&ercs).into_hierarchy().unwrap();
    assert_eq!(bcd.to_string(), "{F1} >> {M1, M2} >> {F2}");

    let unbiased = Rcd::unbiased().rank(&ercs).into_hierarchy().unwrap();
    assert_eq!(unbiased.to_string(), "{F1, F2} >> {M1, M2}");
}

#[test]
fn test_faithfulness_low_grows_set_when_single_does_not_free() {
    let universe = ConstraintUniverse::builder()
        .markedness("M1")
        .faithfulness("F1")
        .faithfulness("F2")
        .faithfulness("F3")
        .build()
        .unwrap();
    let ercs = ErcSet::from_ercs(
        &universe,
        [
            named(&universe, "e1", &[("M1", Mark::L), ("F1", Mark::W)]),
            named(&universe, "e2", &[("M1", Mark::L), ("F2", Mark::W)]),
        ],
    )
    .unwrap();

    let bcd = Rcd::new(FaithfulnessLow).rank(&ercs).into_hierarchy().unwrap();
    assert_eq!(bcd.to_string(), "{F1, F2} >> {M1} >> {F3}");
}

#[test]
fn test_constraints_low() {
    let universe = scenario_universe();
    let low = ConstraintsLow::from_names(&universe, &["M1"]).unwrap();
    assert_eq!(low.low(), &[0]);

    let empty = ErcSet::new(&universe);
    let h = Rcd::new(low.clone()).rank(&empty).into_hierarchy().unwrap();
    assert_eq!(h.to_string(), "{M2, F1} >> {M1}");

    // M1 is the only rankable constraint in round one, so it is placed anyway.
    let h = Rcd::new(low).rank(&scenario_ercs(&universe)).into_hierarchy().unwrap();
    assert_eq!(h.to_string(), "{M1} >> {M2} >> {F1}");
}

#[test]
fn test_constraints_low_unknown_name() {
    let universe = scenario_universe();
    let err = ConstraintsLow::from_names(&universe, &["Nope"]).unwrap_err();
    assert_eq!(err, OtError::UnknownConstraint("Nope".to_string()));
}

#[derive(Debug)]
struct OutOfRange;

impl RankingBias for OutOfRange {
    fn select(&self, _rankable: &[ConstraintId], _ctx: &BiasContext<'_>) -> Vec<ConstraintId> {
        vec![99]
    }

    fn name(&self) -> &'static str {
        "out_of_range"
    }
}

#[test]
fn test_invalid_bias_selection_falls_back_to_all_rankable() {
    let universe = scenario_universe();
    let ercs = scenario_ercs(&universe);

    let broken = Rcd::new(OutOfRange).rank(&ercs);
    let classic = Rcd::unbiased().rank(&ercs);
    assert_eq!(broken, classic);
}

#[test]
fn test_bias_policy_from_config() {
    let universe = scenario_universe();

    let policy = BiasPolicy::from_config(&BiasConfig::FaithfulnessLow, &universe).unwrap();
    assert_eq!(policy, BiasPolicy::FaithfulnessLow(FaithfulnessLow));
    assert_eq!(policy.name(), "faithfulness_low");

    let config = BiasConfig::ConstraintsLow {
        constraints: vec!["F1".to_string()],
    };
    let policy = BiasPolicy::from_config(&config, &universe).unwrap();
    assert_eq!(policy.name(), "constraints_low");

    let bad = BiasConfig::ConstraintsLow {
        constraints: vec!["X".to_string()],
    };
    assert!(BiasPolicy::from_config(&bad, &universe).is_err());

    assert_eq!(BiasPolicy::default().name(), "unbiased");
}

#[test]
fn test_soundness_and_completeness_against_oracle() {
    let mut consistent = 0;
    let mut inconsistent = 0;
    for seed in 0..300 {
        let n_constraints = 3 + (seed % 2) as usize;
        let n_ercs = 1 + (seed % 6) as usize;
        let ercs = random_ercs(seed, n_constraints, n_ercs);

        match Rcd::unbiased().rank(&ercs) {
            RankingOutcome::Consistent(h) => {
                consistent += 1;
                assert!(h.is_complete(), "seed {}", seed);
                assert!(h.satisfies_all(&ercs), "seed {}: {} fails\n{}", seed, h, ercs);
            }
            RankingOutcome::Inconsistent(i) => {
                inconsistent += 1;
                assert!(!exists_total_order(&ercs), "seed {}: spurious failure\n{}", seed, ercs);
                assert!(!i.residue.is_empty(), "seed {}", seed);
            }
        }
    }
    assert!(consistent > 0);
    assert!(inconsistent > 0);
}

#[test]
fn test_determinism() {
    for seed in 0..50 {
        let ercs = random_ercs(seed, 4, 4);
        for policy in all_policies(ercs.universe()) {
            let rcd = Rcd::new(policy);
            assert_eq!(rcd.rank(&ercs), rcd.rank(&ercs), "seed {}", seed);
        }
    }
}

#[test]
fn test_bias_never_changes_verdict() {
    for seed in 0..200 {
        let ercs = random_ercs(seed, 4, 1 + (seed % 5) as usize);
        let verdict = Rcd::unbiased().rank(&ercs).is_consistent();

        for policy in all_policies(ercs.universe()) {
            let name = policy.name();
            let outcome = Rcd::new(policy).rank(&ercs);
            assert_eq!(outcome.is_consistent(), verdict, "seed {} bias {}", seed, name);
            if let Some(h) = outcome.hierarchy() {
                assert!(h.satisfies_all(&ercs), "seed {} bias {}: {}", seed, name, h);
            }
        }
    }
}

#[test]
fn test_rounds_bounded_by_universe_size() {
    for seed in 0..100 {
        let ercs = random_ercs(seed, 4, 3);
        match Rcd::new(FaithfulnessLow).rank(&ercs) {
            RankingOutcome::Consistent(h) => assert!(h.len() <= 4),
            RankingOutcome::Inconsistent(i) => assert!(i.round <= 4),
        }
    }
}

#[test]
fn test_erc_set_queries() {
    let universe = scenario_universe();
    let ercs = scenario_ercs(&universe);
    assert!(ercs.is_consistent());

    let transitive = erc(&universe, "t", [Mark::W, Mark::E, Mark::L]);
    assert!(ercs.entails(&transitive).unwrap());
    let support = ercs.minimal_support(&transitive).unwrap().unwrap();
    assert_eq!(support.len(), 2);

    let reversed = erc(&universe, "r", [Mark::E, Mark::L, Mark::W]);
    assert!(!ercs.entails(&reversed).unwrap());
    assert!(ercs.minimal_support(&reversed).unwrap().is_none());

    let d1 = ercs.get(0).unwrap().clone();
    let support = ercs.minimal_support(&d1).unwrap().unwrap();
    assert_eq!(support.len(), 1);
    assert_eq!(support.get(0).unwrap().label(), "d1");
}

#[test]
fn test_ranker_trait() {
    let universe = scenario_universe();
    let ercs = scenario_ercs(&universe);
    assert!(ercs.is_consistent_with(&Rcd::new(MarkednessLow)));
    assert!(Ranker::is_consistent(&Rcd::unbiased(), &ercs));
}
