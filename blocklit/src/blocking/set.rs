//! Candidate blocking sets of a single clause.
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use blocklit_formula::{Lit, LiteralOccurrenceLookup};

use crate::blocking::literal::BlockingLiteralSelectionHeuristic;
use crate::Error;

/// Inclusive bounds on the size of the enumerated blocking sets.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct CandidateSizeBounds {
    pub min: usize,
    pub max: usize,
}

/// Enumerates the subsets of a clause that are worth trying as blocking sets.
///
/// Literals whose negation occurs nowhere in the formula cannot contribute to
/// a blocking set (their resolution environment is empty), so they are
/// filtered out up front. The remaining literals are permuted by the
/// configured heuristic; subsets of the permuted list are then enumerated in
/// non-decreasing size, lexicographically by position within each size.
pub struct LiteralOccurrenceBlockingSetCandidateGenerator {
    heuristic: BlockingLiteralSelectionHeuristic,
    rng: Option<StdRng>,

    literals: Vec<Lit>,
    positions: Vec<usize>,
    max_size: usize,
    primed: bool,
    exhausted: bool,
}

impl LiteralOccurrenceBlockingSetCandidateGenerator {
    pub fn sequential() -> LiteralOccurrenceBlockingSetCandidateGenerator {
        Self::with_heuristic(BlockingLiteralSelectionHeuristic::Sequential, None)
    }

    pub fn random(rng_seed: u64) -> LiteralOccurrenceBlockingSetCandidateGenerator {
        Self::with_heuristic(
            BlockingLiteralSelectionHeuristic::Random,
            Some(StdRng::seed_from_u64(rng_seed)),
        )
    }

    pub fn min_clause_overlap() -> LiteralOccurrenceBlockingSetCandidateGenerator {
        Self::with_heuristic(BlockingLiteralSelectionHeuristic::MinClauseOverlap, None)
    }

    pub fn max_clause_overlap() -> LiteralOccurrenceBlockingSetCandidateGenerator {
        Self::with_heuristic(BlockingLiteralSelectionHeuristic::MaxClauseOverlap, None)
    }

    fn with_heuristic(
        heuristic: BlockingLiteralSelectionHeuristic,
        rng: Option<StdRng>,
    ) -> LiteralOccurrenceBlockingSetCandidateGenerator {
        LiteralOccurrenceBlockingSetCandidateGenerator {
            heuristic,
            rng,
            literals: vec![],
            positions: vec![],
            max_size: 0,
            primed: false,
            exhausted: true,
        }
    }

    /// Loads the literals of the clause to check.
    ///
    /// Fails on clauses with fewer than two literals, on inverted size
    /// bounds, on a zero minimum size, and on a maximum size exceeding the
    /// number of literals that survive the occurrence filter.
    pub fn init(
        &mut self,
        literals: &[Lit],
        lookup: &LiteralOccurrenceLookup,
        size_bounds: Option<CandidateSizeBounds>,
    ) -> Result<(), Error> {
        use BlockingLiteralSelectionHeuristic::*;

        if literals.len() < 2 {
            return Err(Error::ClauseTooShort {
                len: literals.len(),
            });
        }

        self.literals.clear();
        self.literals.extend(
            literals
                .iter()
                .copied()
                .filter(|&lit| lookup.count(!lit) > 0),
        );

        match self.heuristic {
            Sequential => (),
            Random => {
                let rng = self.rng.as_mut().expect("random generator carries an rng");
                self.literals.shuffle(rng);
            }
            MinClauseOverlap => {
                self.literals.sort_by_key(|&lit| lookup.count(!lit));
            }
            MaxClauseOverlap => {
                self.literals
                    .sort_by_key(|&lit| std::cmp::Reverse(lookup.count(!lit)));
            }
        }

        let bounds = match size_bounds {
            Some(bounds) => {
                if bounds.min == 0 || bounds.min > bounds.max {
                    return Err(Error::InvalidSizeBounds {
                        min: bounds.min,
                        max: bounds.max,
                    });
                }
                if bounds.max > self.literals.len() {
                    return Err(Error::SizeBoundExceedsCandidates {
                        max: bounds.max,
                        eligible: self.literals.len(),
                    });
                }
                bounds
            }
            None => {
                if self.literals.is_empty() {
                    self.positions.clear();
                    self.primed = false;
                    self.exhausted = true;
                    return Ok(());
                }
                CandidateSizeBounds {
                    min: 1,
                    max: self.literals.len(),
                }
            }
        };

        self.positions = (0..bounds.min).collect();
        self.max_size = bounds.max;
        self.primed = true;
        self.exhausted = false;
        Ok(())
    }

    /// The next candidate subset, in non-decreasing size, or `None` once all
    /// subsets within the size bounds have been produced.
    pub fn next_candidate(&mut self) -> Option<Vec<Lit>> {
        if self.exhausted {
            return None;
        }
        if self.primed {
            self.primed = false;
            return Some(self.current());
        }
        if !self.advance() {
            self.exhausted = true;
            return None;
        }
        Some(self.current())
    }

    fn current(&self) -> Vec<Lit> {
        self.positions
            .iter()
            .map(|&position| self.literals[position])
            .collect()
    }

    /// Steps to the next position combination, growing the subset size once
    /// all combinations of the current size are spent.
    fn advance(&mut self) -> bool {
        let size = self.positions.len();
        let available = self.literals.len();

        // Rightmost position that can still move right, leaving room for the
        // positions after it.
        let mut index = size;
        while index > 0 {
            index -= 1;
            if self.positions[index] < available - (size - index) {
                self.positions[index] += 1;
                for follower in index + 1..size {
                    self.positions[follower] = self.positions[follower - 1] + 1;
                }
                return true;
            }
        }

        if size + 1 > self.max_size {
            return false;
        }
        self.positions = (0..size + 1).collect();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use blocklit_formula::lits;

    fn lookup_with(num_variables: usize, clauses: &[&[isize]]) -> LiteralOccurrenceLookup {
        let mut lookup = LiteralOccurrenceLookup::new(num_variables).unwrap();
        for (cid, clause) in clauses.iter().enumerate() {
            let literals: Vec<Lit> = clause.iter().map(|&n| Lit::from_dimacs(n)).collect();
            lookup.record(cid, &literals);
        }
        lookup
    }

    fn drain(
        generator: &mut LiteralOccurrenceBlockingSetCandidateGenerator,
    ) -> Vec<Vec<isize>> {
        let mut out = vec![];
        while let Some(candidate) = generator.next_candidate() {
            out.push(candidate.iter().map(|lit| lit.to_dimacs()).collect());
        }
        out
    }

    #[test]
    fn enumerates_subsets_in_nondecreasing_size() {
        // Every negation occurs somewhere, so nothing is filtered.
        let lookup = lookup_with(3, &[&[-1, -2, -3]]);

        let mut generator = LiteralOccurrenceBlockingSetCandidateGenerator::sequential();
        generator.init(&lits![1, 2, 3], &lookup, None).unwrap();

        assert_eq!(
            drain(&mut generator),
            vec![
                vec![1],
                vec![2],
                vec![3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3],
                vec![1, 2, 3],
            ]
        );
        assert_eq!(generator.next_candidate(), None);
    }

    #[test]
    fn size_bounds_restrict_the_enumeration() {
        let lookup = lookup_with(4, &[&[-1, -2, -3, -4]]);

        let mut generator = LiteralOccurrenceBlockingSetCandidateGenerator::sequential();
        generator
            .init(
                &lits![1, 2, 3, 4],
                &lookup,
                Some(CandidateSizeBounds { min: 3, max: 3 }),
            )
            .unwrap();

        assert_eq!(
            drain(&mut generator),
            vec![
                vec![1, 2, 3],
                vec![1, 2, 4],
                vec![1, 3, 4],
                vec![2, 3, 4],
            ]
        );
    }

    #[test]
    fn literals_without_resolution_partners_are_filtered() {
        // Only -1 and -3 occur; 2 cannot be part of any blocking set.
        let lookup = lookup_with(3, &[&[-1, -3]]);

        let mut generator = LiteralOccurrenceBlockingSetCandidateGenerator::sequential();
        generator.init(&lits![1, 2, 3], &lookup, None).unwrap();

        assert_eq!(
            drain(&mut generator),
            vec![vec![1], vec![3], vec![1, 3]]
        );
    }

    #[test]
    fn each_qualifying_subset_appears_exactly_once() {
        let lookup = lookup_with(5, &[&[-1, -2, -3, -4, -5]]);

        let mut generator = LiteralOccurrenceBlockingSetCandidateGenerator::sequential();
        generator.init(&lits![1, 2, 3, 4, 5], &lookup, None).unwrap();

        let candidates = drain(&mut generator);
        assert_eq!(candidates.len(), 31);

        let mut seen = std::collections::HashSet::new();
        let mut last_size = 0;
        for candidate in &candidates {
            assert!(candidate.len() >= last_size, "sizes must not decrease");
            last_size = candidate.len();
            let mut key = candidate.clone();
            key.sort_unstable();
            assert!(seen.insert(key), "duplicate candidate {:?}", candidate);
        }
    }

    #[test]
    fn rejects_invalid_configurations() {
        let lookup = lookup_with(3, &[&[-1, -2, -3]]);
        let mut generator = LiteralOccurrenceBlockingSetCandidateGenerator::sequential();

        assert_eq!(
            generator.init(&lits![1], &lookup, None).err(),
            Some(Error::ClauseTooShort { len: 1 })
        );
        assert_eq!(
            generator
                .init(
                    &lits![1, 2],
                    &lookup,
                    Some(CandidateSizeBounds { min: 2, max: 1 }),
                )
                .err(),
            Some(Error::InvalidSizeBounds { min: 2, max: 1 })
        );
        assert_eq!(
            generator
                .init(
                    &lits![1, 2],
                    &lookup,
                    Some(CandidateSizeBounds { min: 0, max: 1 }),
                )
                .err(),
            Some(Error::InvalidSizeBounds { min: 0, max: 1 })
        );
        assert_eq!(
            generator
                .init(
                    &lits![1, 2],
                    &lookup,
                    Some(CandidateSizeBounds { min: 1, max: 3 }),
                )
                .err(),
            Some(Error::SizeBoundExceedsCandidates { max: 3, eligible: 2 })
        );
    }

    #[test]
    fn no_candidates_when_nothing_survives_the_filter() {
        let lookup = lookup_with(3, &[&[1, 2, 3]]);
        let mut generator = LiteralOccurrenceBlockingSetCandidateGenerator::sequential();
        generator.init(&lits![1, 2], &lookup, None).unwrap();
        assert_eq!(generator.next_candidate(), None);
    }

    #[test]
    fn min_overlap_orders_before_enumerating() {
        // count(-1) = 2, count(-2) = 1.
        let lookup = lookup_with(2, &[&[-1, -2], &[-1]]);

        let mut generator = LiteralOccurrenceBlockingSetCandidateGenerator::min_clause_overlap();
        generator.init(&lits![1, 2], &lookup, None).unwrap();

        assert_eq!(
            drain(&mut generator),
            vec![vec![2], vec![1], vec![2, 1]]
        );
    }
}
