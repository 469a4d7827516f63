//! Tests for competitions and candidate evaluation.

use super::*;
use crate::test_utils::{candidate, three_constraints};

fn coda_competition() -> Competition {
    // M1 = NoCoda, M2 = Onset, F1 = Max
    let universe = three_constraints();
    Competition::new(
        &universe,
        "/pat/",
        vec![
            candidate("pat", &[1, 0, 0]),
            candidate("pa", &[0, 0, 1]),
            candidate("at", &[1, 1, 1]),
        ],
    )
    .unwrap()
}

#[test]
fn test_empty_competition_rejected() {
    let universe = three_constraints();
    let err = Competition::new(&universe, "/x/", Vec::new()).unwrap_err();
    assert_eq!(err, OtError::EmptyCompetition("/x/".to_string()));
}

#[test]
fn test_profile_length_checked() {
    let universe = three_constraints();
    let err = Competition::new(&universe, "/x/", vec![candidate("x", &[0, 0])]).unwrap_err();
    assert_eq!(
        err,
        OtError::MarkCountMismatch {
            expected: 3,
            found: 2
        }
    );
}

#[test]
fn test_with_winner() {
    let competition = coda_competition().with_winner(1).unwrap();
    assert_eq!(competition.winner(), Some(1));
    assert_eq!(competition.winner_candidate().unwrap().output(), "pa");

    let err = coda_competition().with_winner(3).unwrap_err();
    assert!(matches!(err, OtError::WinnerOutOfRange { index: 3, len: 3, .. }));
}

#[test]
fn test_with_winner_output() {
    let competition = coda_competition().with_winner_output("pat").unwrap();
    assert_eq!(competition.winner(), Some(0));

    let err = coda_competition().with_winner_output("ta").unwrap_err();
    assert_eq!(
        err,
        OtError::UnknownCandidate {
            input: "/pat/".to_string(),
            output: "ta".to_string()
        }
    );
}

#[test]
fn test_optima_total_order() {
    let competition = coda_competition();
    let universe = Arc::clone(competition.universe());

    let faithful = Hierarchy::total(&universe, &[2, 0, 1]).unwrap();
    assert_eq!(competition.optima(&faithful), vec![0]);

    let deleting = Hierarchy::total(&universe, &[0, 2, 1]).unwrap();
    assert_eq!(competition.optima(&deleting), vec![1]);
}

#[test]
fn test_optima_pools_ties() {
    let competition = coda_competition();
    let universe = Arc::clone(competition.universe());

    // NoCoda and Max tied: pat and pa each incur one pooled violation.
    let tied = Hierarchy::new(&universe, vec![vec![0, 2], vec![1]]).unwrap();
    assert_eq!(competition.optima(&tied), vec![0, 1]);
}

#[test]
fn test_optima_partial_hierarchy_pools_unplaced() {
    let competition = coda_competition();
    let universe = Arc::clone(competition.universe());

    let partial = Hierarchy::partial(&universe, vec![vec![1]]).unwrap();
    assert_eq!(competition.optima(&partial), vec![0, 1]);
}

#[test]
fn test_ercs_for_skips_identical_profiles() {
    let universe = three_constraints();
    let competition = Competition::new(
        &universe,
        "/ta/",
        vec![
            candidate("ta", &[0, 0, 0]),
            candidate("ta2", &[0, 0, 0]),
            candidate("a", &[0, 1, 1]),
        ],
    )
    .unwrap();

    let ercs = competition.ercs_for(0).unwrap();
    assert_eq!(ercs.len(), 1);
    assert_eq!(ercs.get(0).unwrap().marks(), &[Mark::E, Mark::W, Mark::W]);
    assert_eq!(ercs.get(0).unwrap().label(), "/ta/: ta > a");
}

#[test]
fn test_harmonic_bounding() {
    let competition = coda_competition();
    // "at" is worse than "pat" or equal everywhere.
    assert_eq!(competition.harmonically_bounded(), vec![2]);
    assert_eq!(competition.contenders(), vec![0, 1]);
}

#[test]
fn test_identical_profiles_are_not_bounded() {
    let universe = three_constraints();
    let competition = Competition::new(
        &universe,
        "/ta/",
        vec![candidate("ta", &[0, 1, 0]), candidate("ta2", &[0, 1, 0])],
    )
    .unwrap();
    assert!(competition.harmonically_bounded().is_empty());
}
