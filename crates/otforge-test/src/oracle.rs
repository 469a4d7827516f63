//! Brute-force ranking oracle.
//!
//! Enumerates every total order of a universe. Exponential; meant for
//! universes of at most five or six constraints.

use std::collections::BTreeSet;

use otforge_core::{Competition, ConstraintId, ErcSet, Hierarchy};

/// A language as a sorted set of `(input, output)` winner pairs.
pub type WinnerSet = BTreeSet<(String, String)>;

/// Every permutation of `0..n`, in lexicographic order.
pub fn total_orders(n: usize) -> Vec<Vec<ConstraintId>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(n);
    let mut used = vec![false; n];
    permute(n, &mut current, &mut used, &mut out);
    out
}

fn permute(
    n: usize,
    current: &mut Vec<ConstraintId>,
    used: &mut [bool],
    out: &mut Vec<Vec<ConstraintId>>,
) {
    if current.len() == n {
        out.push(current.clone());
        return;
    }
    for id in 0..n {
        if used[id] {
            continue;
        }
        used[id] = true;
        current.push(id);
        permute(n, current, used, out);
        current.pop();
        used[id] = false;
    }
}

/// True if some total order satisfies every ERC of `ercs`.
///
/// Any stratified hierarchy satisfying a collection can be refined into a
/// total order that still satisfies it, so this decides consistency.
pub fn exists_total_order(ercs: &ErcSet) -> bool {
    let universe = ercs.universe();
    total_orders(universe.len()).iter().any(|order| {
        Hierarchy::total(universe, order)
            .map(|h| h.satisfies_all(ercs))
            .unwrap_or(false)
    })
}

/// The factorial typology of `competitions`, computed by evaluating every
/// total order.
///
/// Under a total order all optima share one violation profile; the first of
/// them names the winner, as the typology generator does for tied outputs.
pub fn oracle_typology(competitions: &[Competition]) -> BTreeSet<WinnerSet> {
    let Some(universe) = competitions.first().map(|c| c.universe().clone()) else {
        return BTreeSet::from([WinnerSet::new()]);
    };

    let mut languages = BTreeSet::new();
    for order in total_orders(universe.len()) {
        let Ok(hierarchy) = Hierarchy::total(&universe, &order) else {
            continue;
        };
        let language = competitions
            .iter()
            .filter_map(|competition| {
                let first = *competition.optima(&hierarchy).first()?;
                Some((
                    competition.input().to_string(),
                    competition.candidates()[first].output().to_string(),
                ))
            })
            .collect();
        languages.insert(language);
    }
    languages
}
