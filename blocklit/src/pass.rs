//! Driving a whole elimination pass over a formula.
use std::time::{Duration, Instant};

use log::{debug, info};

use blocklit_formula::Formula;

use crate::bce::BlockedClauseEliminator;
use crate::blocking::{
    BlockingLiteralGenerator, BlockingLiteralSelectionHeuristic, CandidateSizeBounds,
    LiteralOccurrenceBlockingSetCandidateGenerator,
};
use crate::overlap::{AvlIntervalTreeOverlap, LiteralOccurrenceOverlap, OverlapSource};
use crate::sbce::SetBlockedClauseEliminator;
use crate::select::{CandidateSelectionHeuristic, ClauseCandidateSelector};
use crate::Error;

/// Which overlap index the elimination checks run against.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum EliminatorBackend {
    LiteralOccurrence,
    AvlIntervalTree,
}

/// Configuration of a preprocessing pass.
#[derive(Clone, Debug)]
pub struct PassConfig {
    pub backend: EliminatorBackend,
    pub clause_selection: CandidateSelectionHeuristic,
    pub clause_selection_rng_seed: Option<u64>,
    pub literal_selection: BlockingLiteralSelectionHeuristic,
    pub literal_selection_rng_seed: Option<u64>,
    /// Upper bound on checked candidates; defaults to every clause.
    pub num_candidates: Option<usize>,
    /// Stop after this many clauses have been eliminated.
    pub max_matches: Option<usize>,
    /// Skip candidate clauses with more literals than this.
    pub max_clause_length: Option<usize>,
    /// Size bounds for the blocking sets of an SBCE pass.
    pub blocking_set_size_bounds: Option<CandidateSizeBounds>,
    /// Wall-clock budget, enforced between candidates by this driver; the
    /// checks themselves never watch the clock.
    pub time_budget: Option<Duration>,
}

impl Default for PassConfig {
    fn default() -> PassConfig {
        PassConfig {
            backend: EliminatorBackend::LiteralOccurrence,
            clause_selection: CandidateSelectionHeuristic::Sequential,
            clause_selection_rng_seed: None,
            literal_selection: BlockingLiteralSelectionHeuristic::Sequential,
            literal_selection_rng_seed: None,
            num_candidates: None,
            max_matches: None,
            max_clause_length: None,
            blocking_set_size_bounds: None,
            time_budget: None,
        }
    }
}

/// Tallies of one preprocessing pass.
#[derive(Clone, Debug, Default)]
pub struct PassStats {
    pub candidates_checked: usize,
    pub clauses_removed: usize,
    pub literals_removed: usize,
    pub elapsed: Duration,
}

/// Removes blocked clauses from the formula until the candidate sequence or
/// one of the configured budgets runs out.
pub fn run_bce(formula: &mut Formula, config: &PassConfig) -> Result<PassStats, Error> {
    match config.backend {
        EliminatorBackend::LiteralOccurrence => {
            run_bce_with(formula, LiteralOccurrenceOverlap::new(), config)
        }
        EliminatorBackend::AvlIntervalTree => {
            run_bce_with(formula, AvlIntervalTreeOverlap::new(), config)
        }
    }
}

/// Removes set-blocked clauses from the formula, the SBCE analogue of
/// [`run_bce`].
pub fn run_sbce(formula: &mut Formula, config: &PassConfig) -> Result<PassStats, Error> {
    match config.backend {
        EliminatorBackend::LiteralOccurrence => {
            run_sbce_with(formula, LiteralOccurrenceOverlap::new(), config)
        }
        EliminatorBackend::AvlIntervalTree => {
            run_sbce_with(formula, AvlIntervalTreeOverlap::new(), config)
        }
    }
}

fn run_bce_with(
    formula: &mut Formula,
    overlap: impl OverlapSource,
    config: &PassConfig,
) -> Result<PassStats, Error> {
    let start = Instant::now();
    let mut selector = build_selector(formula, config)?;
    let mut generator = build_literal_generator(config)?;

    let mut eliminator = BlockedClauseEliminator::new(overlap);
    eliminator.initialize(formula)?;

    let mut stats = PassStats::default();
    while let Some(cid) = selector.select_next() {
        if out_of_budget(config, start, &stats) {
            break;
        }
        stats.candidates_checked += 1;

        if let Some(blocking) =
            eliminator.determine_blocking_literal(formula, cid, &mut generator)?
        {
            let clause = formula
                .remove_clause(cid)
                .expect("the checked clause is still present");
            eliminator.notify_clause_removed(cid, &clause);

            debug!("clause {} blocked by literal {}", cid, blocking);
            stats.clauses_removed += 1;
            stats.literals_removed += clause.len();
        }
    }

    stats.elapsed = start.elapsed();
    info!(
        "bce pass: {} of {} checked clauses blocked ({} literals) in {:?}",
        stats.clauses_removed, stats.candidates_checked, stats.literals_removed, stats.elapsed
    );
    Ok(stats)
}

fn run_sbce_with(
    formula: &mut Formula,
    overlap: impl OverlapSource,
    config: &PassConfig,
) -> Result<PassStats, Error> {
    let start = Instant::now();
    let mut selector = build_selector(formula, config)?;
    let mut generator = build_set_generator(config)?;

    let mut eliminator = SetBlockedClauseEliminator::new(overlap);
    eliminator.initialize(formula)?;

    let mut stats = PassStats::default();
    while let Some(cid) = selector.select_next() {
        if out_of_budget(config, start, &stats) {
            break;
        }
        stats.candidates_checked += 1;

        let found = match eliminator.determine_blocking_set(
            formula,
            cid,
            &mut generator,
            config.blocking_set_size_bounds,
        ) {
            // A candidate with fewer eligible literals than the requested
            // set size has no witness of that size; move on.
            Err(Error::SizeBoundExceedsCandidates { .. }) => continue,
            other => other?,
        };

        if let Some(blocking_set) = found {
            let clause = formula
                .remove_clause(cid)
                .expect("the checked clause is still present");
            eliminator.notify_clause_removed(cid, &clause);

            debug!(
                "clause {} blocked by a set of {} literals",
                cid,
                blocking_set.len()
            );
            stats.clauses_removed += 1;
            stats.literals_removed += clause.len();
        }
    }

    stats.elapsed = start.elapsed();
    info!(
        "sbce pass: {} of {} checked clauses set-blocked ({} literals) in {:?}",
        stats.clauses_removed, stats.candidates_checked, stats.literals_removed, stats.elapsed
    );
    Ok(stats)
}

fn build_selector(formula: &Formula, config: &PassConfig) -> Result<ClauseCandidateSelector, Error> {
    ClauseCandidateSelector::init(
        formula,
        config.clause_selection,
        config.num_candidates.unwrap_or_else(|| formula.len()),
        config.clause_selection_rng_seed,
        config.max_clause_length,
    )
}

fn build_literal_generator(config: &PassConfig) -> Result<BlockingLiteralGenerator, Error> {
    use BlockingLiteralSelectionHeuristic::*;
    match (config.literal_selection, config.literal_selection_rng_seed) {
        (Random, Some(seed)) => Ok(BlockingLiteralGenerator::random(seed)),
        (Random, None) => Err(Error::MissingRngSeed),
        (_, Some(_)) => Err(Error::UnexpectedRngSeed),
        (Sequential, None) => Ok(BlockingLiteralGenerator::sequential()),
        (MinClauseOverlap, None) => Ok(BlockingLiteralGenerator::min_clause_overlap()),
        (MaxClauseOverlap, None) => Ok(BlockingLiteralGenerator::max_clause_overlap()),
    }
}

fn build_set_generator(
    config: &PassConfig,
) -> Result<LiteralOccurrenceBlockingSetCandidateGenerator, Error> {
    use BlockingLiteralSelectionHeuristic::*;
    match (config.literal_selection, config.literal_selection_rng_seed) {
        (Random, Some(seed)) => Ok(LiteralOccurrenceBlockingSetCandidateGenerator::random(seed)),
        (Random, None) => Err(Error::MissingRngSeed),
        (_, Some(_)) => Err(Error::UnexpectedRngSeed),
        (Sequential, None) => Ok(LiteralOccurrenceBlockingSetCandidateGenerator::sequential()),
        (MinClauseOverlap, None) => {
            Ok(LiteralOccurrenceBlockingSetCandidateGenerator::min_clause_overlap())
        }
        (MaxClauseOverlap, None) => {
            Ok(LiteralOccurrenceBlockingSetCandidateGenerator::max_clause_overlap())
        }
    }
}

fn out_of_budget(config: &PassConfig, start: Instant, stats: &PassStats) -> bool {
    if let Some(max_matches) = config.max_matches {
        if stats.clauses_removed >= max_matches {
            return true;
        }
    }
    if let Some(budget) = config.time_budget {
        if start.elapsed() >= budget {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    use blocklit_formula::Lit;

    fn formula_with(num_variables: usize, clauses: &[&[isize]]) -> Formula {
        let mut formula = Formula::new(num_variables, clauses.len()).unwrap();
        for (cid, clause) in clauses.iter().enumerate() {
            formula
                .add_clause(cid, clause.iter().map(|&number| Lit::from_dimacs(number)))
                .unwrap();
        }
        formula
    }

    /// Removing one blocked clause can expose the next blocking: clause 1 is
    /// only blocked once clause 0 has left the resolution environment of its
    /// literal 1.
    #[test]
    fn cascading_elimination() {
        let mut formula = formula_with(
            5,
            &[&[-1, 2, 3], &[1, 2], &[-3, -2], &[-1, -2, 5]],
        );

        let stats = run_bce(&mut formula, &PassConfig::default()).unwrap();
        assert_eq!(stats.candidates_checked, 4);
        assert_eq!(stats.clauses_removed, 2);
        assert!(formula.get_clause(0).is_none());
        assert!(formula.get_clause(1).is_none());
        assert!(formula.get_clause(2).is_some());
        assert!(formula.get_clause(3).is_some());
    }

    #[test]
    fn match_budget_stops_the_pass() {
        let mut formula = formula_with(3, &[&[1, 2, -3], &[-1, 2, 3], &[1, -2, 3]]);

        let config = PassConfig {
            max_matches: Some(1),
            ..PassConfig::default()
        };
        let stats = run_bce(&mut formula, &config).unwrap();
        assert_eq!(stats.clauses_removed, 1);
        assert_eq!(formula.len(), 2);
    }

    #[test]
    fn backends_remove_the_same_clauses() {
        let clauses: &[&[isize]] = &[
            &[1, 2, -3],
            &[-1, 2, 3],
            &[1, -2, 3],
            &[-4, 5],
            &[4, -5, 1],
            &[2, 4, 5],
        ];

        let mut with_occurrence = formula_with(5, clauses);
        let occurrence_stats = run_bce(&mut with_occurrence, &PassConfig::default()).unwrap();

        let mut with_tree = formula_with(5, clauses);
        let tree_config = PassConfig {
            backend: EliminatorBackend::AvlIntervalTree,
            ..PassConfig::default()
        };
        let tree_stats = run_bce(&mut with_tree, &tree_config).unwrap();

        assert_eq!(occurrence_stats.clauses_removed, tree_stats.clauses_removed);
        assert_eq!(with_occurrence.stringify(), with_tree.stringify());
    }

    #[test]
    fn sbce_pass_eliminates_set_blocked_clauses() {
        let mut formula = formula_with(
            5,
            &[
                &[1, 2, 3, 4, 5],
                &[1, -2, 3],
                &[-1, 2, 3],
                &[-1, -2, -3, 4, -5],
            ],
        );

        let config = PassConfig {
            blocking_set_size_bounds: Some(CandidateSizeBounds { min: 3, max: 3 }),
            ..PassConfig::default()
        };
        let stats = run_sbce(&mut formula, &config).unwrap();

        assert!(stats.clauses_removed >= 1);
        assert!(formula.get_clause(3).is_none());
    }

    #[test]
    fn seed_validation_happens_before_any_work() {
        let mut formula = formula_with(2, &[&[1, 2]]);

        let config = PassConfig {
            literal_selection: BlockingLiteralSelectionHeuristic::Random,
            ..PassConfig::default()
        };
        assert_eq!(run_bce(&mut formula, &config).err(), Some(Error::MissingRngSeed));
        assert_eq!(formula.len(), 1);
    }
}
