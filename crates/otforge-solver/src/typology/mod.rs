//! Factorial typology generation.
//!
//! The typology of a constraint system is the set of winner assignments,
//! one winner per competition, that some ranking derives. The generator
//! walks the cross product of candidate choices depth first, in competition
//! order, carrying the ERCs implied by the choices made so far. A branch is
//! abandoned as soon as RCD finds its ERCs inconsistent, so only jointly
//! rankable prefixes are extended.
//!
//! Candidates sharing a violation profile are one choice: no ranking
//! separates them, so the first stands for all and the rest are reported
//! as [`Winner::tied`]. With at most one choice per profile, every ranking
//! derives at most one language and the typology never exceeds `n!`.
//!
//! `language_limit` counts distinct languages. Each branch searches until
//! it holds one more than the limit; the surplus is dropped after the join
//! and marks the typology as not exhaustive.
//!
//! # Parallelism
//!
//! Subtrees below different winners of the first competition share no
//! state. With a thread count other than `none` they are explored on a
//! rayon pool; results are joined in branch order and deduplicated after
//! the join, so the output does not depend on the thread count.

mod node;

use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use otforge_config::TypologyConfig;
use otforge_core::{Competition, ConstraintUniverse, ErcSet, Hierarchy, OtError, Result};
use rayon::prelude::*;
use tracing::{info, trace, warn};

use crate::rcd::{BiasPolicy, RankingBias, RankingOutcome, Rcd};
use crate::stats::TypologyStats;

pub use node::TypologyNode;

/// The winner chosen for one competition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Winner {
    /// Input of the competition.
    pub input: String,
    /// Output of the winning candidate.
    pub output: String,
    /// Index of the winning candidate.
    pub candidate: usize,
    /// Outputs of other candidates with the winner's violation profile.
    ///
    /// They win under exactly the same rankings, so they are folded into
    /// this winner instead of forming languages of their own.
    pub tied: Vec<String>,
}

/// One language of the typology.
#[derive(Debug, Clone)]
pub struct Language {
    winners: Vec<Winner>,
    ercs: ErcSet,
    hierarchy: Hierarchy,
}

impl Language {
    /// Winners in competition order.
    pub fn winners(&self) -> &[Winner] {
        &self.winners
    }

    /// ERCs implied by the winners.
    pub fn ercs(&self) -> &ErcSet {
        &self.ercs
    }

    /// A hierarchy deriving every winner.
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Output chosen for `input`, if the typology has such a competition.
    pub fn output_for(&self, input: &str) -> Option<&str> {
        self.winners
            .iter()
            .find(|w| w.input == input)
            .map(|w| w.output.as_str())
    }

    /// The `(input, output)` pairs identifying this language.
    pub fn winner_set(&self) -> BTreeSet<(String, String)> {
        self.winners
            .iter()
            .map(|w| (w.input.clone(), w.output.clone()))
            .collect()
    }
}

/// Result of a typology run.
#[derive(Debug, Clone)]
pub struct Typology {
    languages: Vec<Language>,
    stats: TypologyStats,
    exhaustive: bool,
}

impl Typology {
    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.languages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Language> {
        self.languages.iter()
    }

    pub fn stats(&self) -> &TypologyStats {
        &self.stats
    }

    /// False if the search was terminated or hit the language limit.
    pub fn is_exhaustive(&self) -> bool {
        self.exhaustive
    }

    pub fn into_languages(self) -> Vec<Language> {
        self.languages
    }
}

impl<'a> IntoIterator for &'a Typology {
    type Item = &'a Language;
    type IntoIter = std::slice::Iter<'a, Language>;

    fn into_iter(self) -> Self::IntoIter {
        self.languages.iter()
    }
}

/// A violation profile that may win its competition, with its ERCs against the rest.
///
/// `candidate` is the first candidate with the profile; `tied` holds the others.
#[derive(Debug, Clone)]
struct Choice {
    candidate: usize,
    tied: Vec<usize>,
    ercs: ErcSet,
}

fn choices_for(competition: &Competition, indices: Vec<usize>) -> Result<Vec<Choice>> {
    let candidates = competition.candidates();
    let mut choices: Vec<Choice> = Vec::new();
    for candidate in indices {
        if let Some(choice) = choices
            .iter_mut()
            .find(|c| candidates[c.candidate].same_profile(&candidates[candidate]))
        {
            choice.tied.push(candidate);
            continue;
        }
        choices.push(Choice {
            candidate,
            tied: Vec::new(),
            ercs: competition.ercs_for(candidate)?,
        });
    }
    Ok(choices)
}

/// Factorial typology generator.
///
/// # Example
///
/// ```
/// use otforge_config::TypologyConfig;
/// use otforge_core::{Candidate, Competition, ConstraintUniverse};
/// use otforge_solver::rcd::Unbiased;
/// use otforge_solver::typology::FactorialTypology;
///
/// let universe = ConstraintUniverse::builder()
///     .markedness("NoCoda")
///     .faithfulness("Max")
///     .build()
///     .unwrap();
///
/// let competitions = vec![Competition::new(
///     &universe,
///     "/pat/",
///     vec![Candidate::new("pat", [1, 0]), Candidate::new("pa", [0, 1])],
/// )
/// .unwrap()];
///
/// let typology = FactorialTypology::new(&universe, competitions, Unbiased, TypologyConfig::default())
///     .unwrap()
///     .generate()
///     .unwrap();
///
/// assert_eq!(typology.len(), 2);
/// assert!(typology.is_exhaustive());
/// ```
#[derive(Debug)]
pub struct FactorialTypology<B = BiasPolicy> {
    universe: Arc<ConstraintUniverse>,
    competitions: Vec<Competition>,
    options: Vec<Vec<Choice>>,
    bounded: u64,
    rcd: Rcd<B>,
    config: TypologyConfig,
}

impl<B: RankingBias> FactorialTypology<B> {
    /// Prepares the search.
    ///
    /// Designated winners on the competitions are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`OtError::UniverseMismatch`] if a competition uses another
    /// universe.
    pub fn new(
        universe: &Arc<ConstraintUniverse>,
        competitions: Vec<Competition>,
        bias: B,
        config: TypologyConfig,
    ) -> Result<Self> {
        let mut bounded = 0u64;
        let mut options = Vec::with_capacity(competitions.len());
        for competition in &competitions {
            if !competition.universe().same_as(universe) {
                return Err(OtError::UniverseMismatch);
            }
            let indices = if config.prune_harmonically_bounded {
                let contenders = competition.contenders();
                bounded += (competition.len() - contenders.len()) as u64;
                contenders
            } else {
                (0..competition.len()).collect()
            };
            options.push(choices_for(competition, indices)?);
        }

        Ok(Self {
            universe: Arc::clone(universe),
            competitions,
            options,
            bounded,
            rcd: Rcd::new(bias),
            config,
        })
    }

    #[inline]
    pub fn universe(&self) -> &Arc<ConstraintUniverse> {
        &self.universe
    }

    #[inline]
    pub fn competitions(&self) -> &[Competition] {
        &self.competitions
    }

    #[inline]
    pub fn config(&self) -> &TypologyConfig {
        &self.config
    }

    /// Runs the search to completion, or to the language limit.
    pub fn generate(&self) -> Result<Typology> {
        let never = AtomicBool::new(false);
        self.generate_with_termination(&never)
    }

    /// Runs the search, abandoning it at the next node once `terminate` is set.
    ///
    /// Languages found before termination are returned; the typology then
    /// reports itself as not exhaustive.
    pub fn generate_with_termination(&self, terminate: &AtomicBool) -> Result<Typology> {
        let start = Instant::now();
        info!(
            event = "typology_start",
            competitions = self.competitions.len() as u64,
            constraints = self.universe.len() as u64,
            bias = self.rcd.bias().name(),
            bounded = self.bounded,
        );

        let search = Search {
            competitions: &self.competitions,
            options: &self.options,
            rcd: &self.rcd,
            limit: self.config.language_limit,
            terminate,
        };
        let root = TypologyNode::root(ErcSet::new(&self.universe));
        let branches = self.run_branches(&search, root)?;

        let mut stats = TypologyStats {
            bounded_candidates: self.bounded,
            ..TypologyStats::default()
        };
        let mut interrupted = false;
        let mut seen: HashSet<BTreeSet<(String, String)>> = HashSet::new();
        let mut languages = Vec::new();
        for branch in branches {
            stats.merge(&branch.stats);
            interrupted |= branch.interrupted;
            for language in branch.languages {
                if seen.insert(language.winner_set()) {
                    languages.push(language);
                } else {
                    stats.duplicates_collapsed += 1;
                }
            }
        }
        if let Some(limit) = self.config.language_limit {
            if languages.len() > limit {
                languages.truncate(limit);
                interrupted = true;
            }
        }
        stats.finish(start);

        info!(
            event = "typology_end",
            languages = languages.len() as u64,
            nodes_explored = stats.nodes_explored,
            branches_pruned = stats.branches_pruned,
            duplicates = stats.duplicates_collapsed,
            elapsed_ms = stats.elapsed_ms(),
        );

        Ok(Typology {
            languages,
            stats,
            exhaustive: !interrupted,
        })
    }

    fn run_branches(&self, search: &Search<'_, B>, root: TypologyNode) -> Result<Vec<Branch>> {
        let Some(first) = self.options.first() else {
            let mut branch = Branch::default();
            search.explore(root, &mut branch)?;
            return Ok(vec![branch]);
        };

        let threads = self.config.thread_count.resolve(first.len());
        if threads > 1 {
            match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => {
                    return pool.install(|| {
                        first
                            .par_iter()
                            .map(|choice| {
                                let mut branch = Branch::default();
                                search.expand(&root, choice, &mut branch)?;
                                Ok(branch)
                            })
                            .collect::<Result<Vec<_>>>()
                    });
                }
                Err(e) => warn!(error = %e, "thread pool unavailable; searching sequentially"),
            }
        }

        let mut branch = Branch::default();
        search.explore(root, &mut branch)?;
        Ok(vec![branch])
    }
}

/// Languages and counters of one top-level branch.
#[derive(Debug, Default)]
struct Branch {
    languages: Vec<Language>,
    seen: HashSet<BTreeSet<(String, String)>>,
    stats: TypologyStats,
    interrupted: bool,
}

/// Read-only search context shared by all branches.
struct Search<'a, B> {
    competitions: &'a [Competition],
    options: &'a [Vec<Choice>],
    rcd: &'a Rcd<B>,
    limit: Option<usize>,
    terminate: &'a AtomicBool,
}

impl<B: RankingBias> Search<'_, B> {
    /// A branch searches for one distinct language past the limit, so a
    /// branch that stops on the limit is known to be incomplete.
    fn should_stop(&self, branch: &Branch) -> bool {
        self.terminate.load(Ordering::Relaxed)
            || self.limit.is_some_and(|limit| branch.languages.len() > limit)
    }

    fn explore(&self, node: TypologyNode, branch: &mut Branch) -> Result<()> {
        if node.is_leaf(self.competitions.len()) {
            // Only the root of an empty competition list gets here unranked.
            branch.stats.record_node();
            if let RankingOutcome::Consistent(hierarchy) = self.rcd.rank(node.ercs()) {
                self.emit(node, hierarchy, branch);
            }
            return Ok(());
        }

        for choice in &self.options[node.depth()] {
            if self.should_stop(branch) {
                branch.interrupted = true;
                return Ok(());
            }
            self.expand(&node, choice, branch)?;
        }
        Ok(())
    }

    fn expand(&self, parent: &TypologyNode, choice: &Choice, branch: &mut Branch) -> Result<()> {
        if self.should_stop(branch) {
            branch.interrupted = true;
            return Ok(());
        }

        let ercs = parent.ercs().with_added(&choice.ercs)?;
        branch.stats.record_node();

        match self.rcd.rank(&ercs) {
            RankingOutcome::Inconsistent(_) => {
                branch.stats.record_prune();
                trace!(
                    event = "typology_prune",
                    depth = parent.depth() as u64,
                    input = self.competitions[parent.depth()].input(),
                    candidate = choice.candidate as u64,
                );
                Ok(())
            }
            RankingOutcome::Consistent(hierarchy) => {
                let child = parent.child(choice.candidate, ercs);
                if child.is_leaf(self.competitions.len()) {
                    self.emit(child, hierarchy, branch);
                    Ok(())
                } else {
                    self.explore(child, branch)
                }
            }
        }
    }

    fn emit(&self, node: TypologyNode, hierarchy: Hierarchy, branch: &mut Branch) {
        let (ercs, chosen) = node.into_parts();
        let output = |competition: &Competition, index: usize| {
            competition
                .candidate(index)
                .map(|c| c.output().to_string())
                .unwrap_or_default()
        };
        let winners: Vec<Winner> = self
            .competitions
            .iter()
            .zip(self.options)
            .zip(chosen)
            .map(|((competition, choices), candidate)| Winner {
                input: competition.input().to_string(),
                output: output(competition, candidate),
                candidate,
                tied: choices
                    .iter()
                    .find(|c| c.candidate == candidate)
                    .map(|c| c.tied.iter().map(|&t| output(competition, t)).collect())
                    .unwrap_or_default(),
            })
            .collect();

        let language = Language {
            winners,
            ercs,
            hierarchy,
        };
        if branch.seen.insert(language.winner_set()) {
            branch.languages.push(language);
        } else {
            branch.stats.duplicates_collapsed += 1;
        }
    }
}
