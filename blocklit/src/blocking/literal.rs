//! Candidate blocking literals of a single clause.
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use blocklit_formula::{Lit, LiteralOccurrenceLookup};

/// Order in which a clause's literals are tried as blocking literals.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BlockingLiteralSelectionHeuristic {
    /// The clause's stored literal order.
    Sequential,
    /// A seeded shuffle.
    Random,
    /// Literals whose negation occurs in few clauses first, so the cheap
    /// resolution environments are checked before the expensive ones.
    MinClauseOverlap,
    /// Literals whose negation occurs in many clauses first.
    MaxClauseOverlap,
}

/// Yields the literals of a clause one at a time, ordered by heuristic.
///
/// A generator is constructed once per pass and re-`init`ed for every
/// candidate clause; the RNG state carries across clauses so distinct
/// clauses see distinct shuffles.
pub struct BlockingLiteralGenerator {
    heuristic: BlockingLiteralSelectionHeuristic,
    rng: Option<StdRng>,
    candidates: Vec<Lit>,
    next_position: usize,
}

impl BlockingLiteralGenerator {
    pub fn sequential() -> BlockingLiteralGenerator {
        Self::with_heuristic(BlockingLiteralSelectionHeuristic::Sequential, None)
    }

    pub fn random(rng_seed: u64) -> BlockingLiteralGenerator {
        Self::with_heuristic(
            BlockingLiteralSelectionHeuristic::Random,
            Some(StdRng::seed_from_u64(rng_seed)),
        )
    }

    pub fn min_clause_overlap() -> BlockingLiteralGenerator {
        Self::with_heuristic(BlockingLiteralSelectionHeuristic::MinClauseOverlap, None)
    }

    pub fn max_clause_overlap() -> BlockingLiteralGenerator {
        Self::with_heuristic(BlockingLiteralSelectionHeuristic::MaxClauseOverlap, None)
    }

    fn with_heuristic(
        heuristic: BlockingLiteralSelectionHeuristic,
        rng: Option<StdRng>,
    ) -> BlockingLiteralGenerator {
        BlockingLiteralGenerator {
            heuristic,
            rng,
            candidates: vec![],
            next_position: 0,
        }
    }

    /// Loads the literals of the clause to check and applies the heuristic
    /// ordering. Resets any previous sequence.
    pub fn init(&mut self, literals: &[Lit], lookup: &LiteralOccurrenceLookup) {
        use BlockingLiteralSelectionHeuristic::*;

        self.candidates.clear();
        self.candidates.extend_from_slice(literals);
        self.next_position = 0;

        match self.heuristic {
            Sequential => (),
            Random => {
                let rng = self.rng.as_mut().expect("random generator carries an rng");
                self.candidates.shuffle(rng);
            }
            MinClauseOverlap => {
                self.candidates.sort_by_key(|&lit| lookup.count(!lit));
            }
            MaxClauseOverlap => {
                self.candidates
                    .sort_by_key(|&lit| std::cmp::Reverse(lookup.count(!lit)));
            }
        }
    }

    /// The next candidate literal, until the clause is exhausted.
    pub fn next_candidate(&mut self) -> Option<Lit> {
        let lit = self.candidates.get(self.next_position).copied()?;
        self.next_position += 1;
        Some(lit)
    }
}
