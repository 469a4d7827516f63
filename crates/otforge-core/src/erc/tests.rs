//! Tests for ERC construction and mark logic.

use super::*;
use crate::test_utils::{candidate, three_constraints};

#[test]
fn test_mark_compare() {
    assert_eq!(Mark::compare(0, 1), Mark::W);
    assert_eq!(Mark::compare(2, 1), Mark::L);
    assert_eq!(Mark::compare(3, 3), Mark::E);
}

#[test]
fn test_mark_fuse() {
    assert_eq!(Mark::W.fuse(Mark::E), Mark::W);
    assert_eq!(Mark::W.fuse(Mark::L), Mark::L);
    assert_eq!(Mark::E.fuse(Mark::E), Mark::E);
    assert_eq!(Mark::L.fuse(Mark::E), Mark::L);
}

#[test]
fn test_new_rejects_wrong_length() {
    let universe = three_constraints();
    let err = Erc::new(&universe, "x", [Mark::W, Mark::L]).unwrap_err();
    assert_eq!(
        err,
        OtError::MarkCountMismatch {
            expected: 3,
            found: 2
        }
    );
}

#[test]
fn test_named_marks_unknown_constraint() {
    let universe = three_constraints();
    let err = Erc::from_named_marks(&universe, "x", &[("Nope", Mark::W)]).unwrap_err();
    assert_eq!(err, OtError::UnknownConstraint("Nope".to_string()));
}

#[test]
fn test_from_comparison() {
    let universe = three_constraints();
    let winner = candidate("a", &[0, 1, 2]);
    let loser = candidate("b", &[1, 1, 0]);

    let erc = Erc::from_comparison(&universe, "a > b", &winner, &loser).unwrap();
    assert_eq!(erc.marks(), &[Mark::W, Mark::E, Mark::L]);
    assert_eq!(erc.winner_preferring().collect::<Vec<_>>(), vec![0]);
    assert_eq!(erc.loser_preferring().collect::<Vec<_>>(), vec![2]);
}

#[test]
fn test_from_comparison_profile_length() {
    let universe = three_constraints();
    let winner = candidate("a", &[0, 1]);
    let loser = candidate("b", &[1, 1, 0]);

    let err = Erc::from_comparison(&universe, "a > b", &winner, &loser).unwrap_err();
    assert_eq!(err, OtError::MarkCountMismatch { expected: 3, found: 2 });

    let err = Erc::from_comparison(&universe, "b > a", &loser, &winner).unwrap_err();
    assert_eq!(err, OtError::MarkCountMismatch { expected: 3, found: 2 });
}

#[test]
fn test_trivial_and_unsatisfiable() {
    let universe = three_constraints();
    let all_e = Erc::new(&universe, "e", [Mark::E; 3]).unwrap();
    let only_w = Erc::from_named_marks(&universe, "w", &[("M1", Mark::W)]).unwrap();
    let only_l = Erc::from_named_marks(&universe, "l", &[("M1", Mark::L)]).unwrap();
    let mixed =
        Erc::from_named_marks(&universe, "m", &[("M1", Mark::W), ("F1", Mark::L)]).unwrap();

    assert!(all_e.is_trivial() && !all_e.is_unsatisfiable());
    assert!(only_w.is_trivial() && !only_w.is_unsatisfiable());
    assert!(!only_l.is_trivial() && only_l.is_unsatisfiable());
    assert!(!mixed.is_trivial() && !mixed.is_unsatisfiable());
}

#[test]
fn test_fuse() {
    let universe = three_constraints();
    let a = Erc::from_named_marks(&universe, "a", &[("M1", Mark::W), ("M2", Mark::L)]).unwrap();
    let b = Erc::from_named_marks(&universe, "b", &[("M2", Mark::W), ("F1", Mark::W)]).unwrap();

    let fused = a.fuse(&b).unwrap();
    assert_eq!(fused.marks(), &[Mark::W, Mark::L, Mark::W]);
    assert_eq!(fused.label(), "a + b");
}

#[test]
fn test_fuse_universe_mismatch() {
    let universe = three_constraints();
    let other = ConstraintUniverse::builder().markedness("X").build().unwrap();
    let a = Erc::new(&universe, "a", [Mark::W, Mark::E, Mark::E]).unwrap();
    let b = Erc::new(&other, "b", [Mark::W]).unwrap();

    assert_eq!(a.fuse(&b).unwrap_err(), OtError::UniverseMismatch);
}

#[test]
fn test_display_and_describe() {
    let universe = three_constraints();
    let erc = Erc::from_named_marks(&universe, "d", &[("M2", Mark::W), ("F1", Mark::L)]).unwrap();

    assert_eq!(erc.to_string(), "d: [e, W, L]");
    assert_eq!(erc.describe(), "d {M2:W, F1:L}");
    assert!(format!("{:?}", erc).contains("M2:W"));
}

#[test]
fn test_same_marks_ignores_label() {
    let universe = three_constraints();
    let a = Erc::new(&universe, "a", [Mark::W, Mark::L, Mark::E]).unwrap();
    let b = a.relabeled("b");

    assert!(a.same_marks(&b));
    assert_ne!(a, b);
}
