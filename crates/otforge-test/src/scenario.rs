//! The three-constraint scenario.
//!
//! Universe `{M1, M2, F1}` with the ERCs
//! `d1 = {M1:W, M2:L, F1:e}` and `d2 = {M1:e, M2:W, F1:L}`, ranked by RCD as
//! `{M1} >> {M2} >> {F1}`.

use std::sync::Arc;

use otforge_core::{ConstraintUniverse, Erc, ErcSet, Mark};

/// Universe `{M1, M2, F1}`; ids 0, 1 and 2.
pub fn scenario_universe() -> Arc<ConstraintUniverse> {
    ConstraintUniverse::builder()
        .markedness("M1")
        .markedness("M2")
        .faithfulness("F1")
        .build()
        .expect("scenario universe is well formed")
}

/// The chain `M1 >> M2 >> F1` as two ERCs.
pub fn scenario_ercs(universe: &Arc<ConstraintUniverse>) -> ErcSet {
    ErcSet::from_ercs(
        universe,
        [
            erc(universe, "d1", [Mark::W, Mark::L, Mark::E]),
            erc(universe, "d2", [Mark::E, Mark::W, Mark::L]),
        ],
    )
    .expect("scenario ERCs share the universe")
}

/// ERC over the scenario universe.
pub fn erc(universe: &Arc<ConstraintUniverse>, label: &str, marks: [Mark; 3]) -> Erc {
    Erc::new(universe, label, marks).expect("three marks for three constraints")
}
