//! Basic syllable-structure typology.
//!
//! Constraints, in id order: `Onset` (M), `NoCoda` (M), `Max` (F), `Dep` (F).
//! Inputs `/pa/`, `/pat/`, `/a/` and `/at/` with deletion and epenthesis
//! candidates. The system has six languages:
//!
//! | /pa/ | /pat/ | /a/ | /at/ |
//! |------|-------|-----|------|
//! | pa | pa.ti | ta | ta.ti |
//! | pa | pa | ta | ta |
//! | pa | pat | ta | tat |
//! | pa | pa.ti | a | a.ti |
//! | pa | pa | a | a |
//! | pa | pat | a | at |
//!
//! The `/pa/` candidate `a` is simply harmonically bounded by `pa`.

use std::sync::Arc;

use otforge_core::{Candidate, Competition, ConstraintUniverse};

/// Number of languages in the syllable typology.
pub const SYLLABLE_LANGUAGES: usize = 6;

/// Universe `{Onset, NoCoda, Max, Dep}`.
pub fn syllable_universe() -> Arc<ConstraintUniverse> {
    ConstraintUniverse::builder()
        .markedness("Onset")
        .markedness("NoCoda")
        .faithfulness("Max")
        .faithfulness("Dep")
        .build()
        .expect("syllable universe is well formed")
}

/// The four competitions, without designated winners.
pub fn syllable_competitions(universe: &Arc<ConstraintUniverse>) -> Vec<Competition> {
    let table: [(&str, &[(&str, [u32; 4])]); 4] = [
        ("/pa/", &[("pa", [0, 0, 0, 0]), ("a", [1, 0, 1, 0])]),
        (
            "/pat/",
            &[("pat", [0, 1, 0, 0]), ("pa", [0, 0, 1, 0]), ("pa.ti", [0, 0, 0, 1])],
        ),
        ("/a/", &[("a", [1, 0, 0, 0]), ("ta", [0, 0, 0, 1])]),
        (
            "/at/",
            &[
                ("at", [1, 1, 0, 0]),
                ("a", [1, 0, 1, 0]),
                ("ta", [0, 0, 1, 1]),
                ("tat", [0, 1, 0, 1]),
                ("a.ti", [1, 0, 0, 1]),
                ("ta.ti", [0, 0, 0, 2]),
            ],
        ),
    ];

    table
        .iter()
        .map(|(input, rows)| {
            let candidates = rows
                .iter()
                .map(|(output, violations)| Candidate::new(*output, violations.iter().copied()))
                .collect();
            Competition::new(universe, *input, candidates).expect("syllable profiles cover the universe")
        })
        .collect()
}

/// The competitions with winners taken from `outputs`, one per input in order.
///
/// # Panics
///
/// Panics if an output is not a candidate of its competition.
pub fn syllable_data(universe: &Arc<ConstraintUniverse>, outputs: [&str; 4]) -> Vec<Competition> {
    syllable_competitions(universe)
        .into_iter()
        .zip(outputs)
        .map(|(c, output)| c.with_winner_output(output).expect("known syllable output"))
        .collect()
}

/// Strictly CV language: onsets are epenthesized, codas deleted.
pub fn cv_language(universe: &Arc<ConstraintUniverse>) -> Vec<Competition> {
    syllable_data(universe, ["pa", "pa", "ta", "ta"])
}

/// Fully faithful language: onsetless syllables and codas surface.
pub fn faithful_language(universe: &Arc<ConstraintUniverse>) -> Vec<Competition> {
    syllable_data(universe, ["pa", "pat", "a", "at"])
}
