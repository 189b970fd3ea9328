//! Selection of candidate clauses for the elimination checks.
use std::cmp::Reverse;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use rustc_hash::FxHashSet;

use blocklit_formula::{ClauseId, Formula};

use crate::Error;

/// Order in which candidate clauses are emitted.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CandidateSelectionHeuristic {
    /// Ascending clause id.
    Sequential,
    /// A seeded shuffle of the clause ids.
    Random,
    /// Fewest clauses resolvable against the candidate first.
    MinOverlap,
    /// Most clauses resolvable against the candidate first.
    MaxOverlap,
    /// Shortest clauses first.
    MinLength,
    /// Longest clauses first.
    MaxLength,
}

/// Yields the ids of the clauses to run an elimination check on, ordered by
/// the configured heuristic.
///
/// The sequence is computed once at construction and is not restartable.
/// Mutating the formula while holding a selector leaves the emitted ids
/// potentially stale, so a preprocessing pass builds the selector first and
/// only removes clauses it has already been handed.
pub struct ClauseCandidateSelector {
    queue: Vec<ClauseId>,
    next_position: usize,
}

impl ClauseCandidateSelector {
    /// Configures a selector over the formula's current clauses.
    ///
    /// At most `num_requested` ids are emitted. `rng_seed` must be present
    /// exactly when the heuristic is [`Random`]. Clauses longer than
    /// `max_clause_length` are filtered out before ordering.
    ///
    /// [`Random`]: CandidateSelectionHeuristic::Random
    pub fn init(
        formula: &Formula,
        heuristic: CandidateSelectionHeuristic,
        num_requested: usize,
        rng_seed: Option<u64>,
        max_clause_length: Option<usize>,
    ) -> Result<ClauseCandidateSelector, Error> {
        use CandidateSelectionHeuristic::*;

        if heuristic == Random && rng_seed.is_none() {
            return Err(Error::MissingRngSeed);
        }
        if heuristic != Random && rng_seed.is_some() {
            return Err(Error::UnexpectedRngSeed);
        }

        let mut queue: Vec<ClauseId> = match max_clause_length {
            None => formula.clause_ids().collect(),
            Some(max_length) => formula
                .clauses()
                .filter(|(_, clause)| clause.len() <= max_length)
                .map(|(cid, _)| cid)
                .collect(),
        };

        match heuristic {
            Sequential => (),
            Random => {
                let mut rng = StdRng::seed_from_u64(rng_seed.expect("validated above"));
                queue.shuffle(&mut rng);
            }
            MinOverlap => {
                queue.sort_by_key(|&cid| (overlap_count(formula, cid), cid));
            }
            MaxOverlap => {
                queue.sort_by_key(|&cid| (Reverse(overlap_count(formula, cid)), cid));
            }
            MinLength => {
                queue.sort_by_key(|&cid| (clause_length(formula, cid), cid));
            }
            MaxLength => {
                queue.sort_by_key(|&cid| (Reverse(clause_length(formula, cid)), cid));
            }
        }

        queue.truncate(num_requested);
        Ok(ClauseCandidateSelector {
            queue,
            next_position: 0,
        })
    }

    pub fn init_sequential(
        formula: &Formula,
        num_requested: usize,
        max_clause_length: Option<usize>,
    ) -> Result<ClauseCandidateSelector, Error> {
        Self::init(
            formula,
            CandidateSelectionHeuristic::Sequential,
            num_requested,
            None,
            max_clause_length,
        )
    }

    pub fn init_random(
        formula: &Formula,
        num_requested: usize,
        rng_seed: u64,
        max_clause_length: Option<usize>,
    ) -> Result<ClauseCandidateSelector, Error> {
        Self::init(
            formula,
            CandidateSelectionHeuristic::Random,
            num_requested,
            Some(rng_seed),
            max_clause_length,
        )
    }

    pub fn init_min_overlap(
        formula: &Formula,
        num_requested: usize,
        max_clause_length: Option<usize>,
    ) -> Result<ClauseCandidateSelector, Error> {
        Self::init(
            formula,
            CandidateSelectionHeuristic::MinOverlap,
            num_requested,
            None,
            max_clause_length,
        )
    }

    pub fn init_max_overlap(
        formula: &Formula,
        num_requested: usize,
        max_clause_length: Option<usize>,
    ) -> Result<ClauseCandidateSelector, Error> {
        Self::init(
            formula,
            CandidateSelectionHeuristic::MaxOverlap,
            num_requested,
            None,
            max_clause_length,
        )
    }

    pub fn init_min_length(
        formula: &Formula,
        num_requested: usize,
        max_clause_length: Option<usize>,
    ) -> Result<ClauseCandidateSelector, Error> {
        Self::init(
            formula,
            CandidateSelectionHeuristic::MinLength,
            num_requested,
            None,
            max_clause_length,
        )
    }

    pub fn init_max_length(
        formula: &Formula,
        num_requested: usize,
        max_clause_length: Option<usize>,
    ) -> Result<ClauseCandidateSelector, Error> {
        Self::init(
            formula,
            CandidateSelectionHeuristic::MaxLength,
            num_requested,
            None,
            max_clause_length,
        )
    }

    /// The next candidate clause id, until the sequence is exhausted.
    pub fn select_next(&mut self) -> Option<ClauseId> {
        let cid = self.queue.get(self.next_position).copied()?;
        self.next_position += 1;
        Some(cid)
    }

    /// Total number of ids this selector will emit.
    pub fn num_generatable(&self) -> usize {
        self.queue.len()
    }
}

/// Number of distinct clauses any literal of the clause resolves against.
fn overlap_count(formula: &Formula, cid: ClauseId) -> usize {
    let clause = match formula.get_clause(cid) {
        Some(clause) => clause,
        None => return usize::max_value(),
    };

    let mut partners: FxHashSet<ClauseId> = FxHashSet::default();
    for &lit in clause.lits() {
        if let Some(cids) = formula.literal_occurrence().get(!lit) {
            partners.extend(cids.iter().copied());
        }
    }
    partners.len()
}

fn clause_length(formula: &Formula, cid: ClauseId) -> usize {
    formula
        .get_clause(cid)
        .map_or(usize::max_value(), |clause| clause.len())
}
