//! DIMACS CNF parser and writer for the blocklit CNF preprocessor.
//!
//! The parser accumulates all diagnosable errors instead of stopping at the
//! first one, so a malformed benchmark file reports every offending line at
//! once. Input clauses are normalized the way the preprocessor expects them:
//! literals sorted ascending by signed value and deduplicated, tautological
//! clauses dropped, and single-literal clauses turned into variable
//! assignments via unit propagation rather than stored.
use std::{borrow::Borrow, io};

use anyhow::Error;
use thiserror::Error;

use blocklit_formula::{Clause, Formula, Lit, Propagation, Var};

/// Possible errors while parsing a DIMACS CNF formula.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParserError {
    #[error("line {line}: unexpected token in DIMACS CNF input: '{token}'")]
    UnexpectedInput { line: usize, token: String },
    #[error("line {line}: literal {literal} is outside the declared variable range 1..={num_variables}")]
    LiteralOutOfRange {
        line: usize,
        literal: isize,
        num_variables: usize,
    },
    #[error("line {line}: invalid header syntax: {header}")]
    InvalidHeader { line: usize, header: String },
    #[error("line {line}: second 'p cnf' header")]
    DuplicateHeader { line: usize },
    #[error("clause data before any 'p cnf' header")]
    MissingHeader,
    #[error("line {line}: header declares {var_count} variables, more than this build supports")]
    UnsupportedVariableCount { line: usize, var_count: usize },
    #[error("line {line}: unterminated clause at end of input")]
    UnterminatedClause { line: usize },
    #[error("line {line}: empty clause makes the formula trivially unsatisfiable")]
    EmptyClause { line: usize },
    #[error("line {line}: unit clause {literal} conflicts with an earlier unit clause")]
    ConflictingUnitClauses { line: usize, literal: isize },
    #[error("formula has {clause_count} clauses while the header specifies {header_clause_count} clauses")]
    ClauseCount {
        clause_count: usize,
        header_clause_count: usize,
    },
}

/// Variable and clause count of a DIMACS CNF header.
#[derive(Copy, Clone, Debug)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// Outcome of a parse: the formula when the input was clean, plus every
/// error encountered along the way.
pub struct ParseResult {
    pub formula: Option<Formula>,
    pub errors: Vec<ParserError>,
}

impl ParseResult {
    pub fn determined_any_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parser for DIMACS CNF files.
pub struct DimacsParser {
    formula: Option<Formula>,
    header: Option<DimacsHeader>,
    errors: Vec<ParserError>,

    partial_clause: Vec<Lit>,
    clause_valid: bool,
    clause_count: usize,
    line_number: usize,
}

impl Default for DimacsParser {
    fn default() -> DimacsParser {
        DimacsParser::new()
    }
}

impl DimacsParser {
    pub fn new() -> DimacsParser {
        DimacsParser {
            formula: None,
            header: None,
            errors: vec![],

            partial_clause: vec![],
            clause_valid: true,
            clause_count: 0,
            line_number: 0,
        }
    }

    /// Parse the given input to completion.
    ///
    /// IO failures are reported through the outer `Result`; everything the
    /// parser can diagnose itself is accumulated in the returned
    /// [`ParseResult`].
    pub fn parse(input: impl io::Read) -> Result<ParseResult, Error> {
        use io::BufRead;

        let mut parser = Self::new();
        for line in io::BufReader::new(input).lines() {
            parser.parse_line(&line?);
        }
        Ok(parser.finish())
    }

    /// Parse an in-memory string.
    pub fn parse_str(input: &str) -> ParseResult {
        let mut parser = Self::new();
        for line in input.lines() {
            parser.parse_line(line);
        }
        parser.finish()
    }

    fn parse_line(&mut self, line: &str) {
        self.line_number += 1;

        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('c') {
            return;
        }
        if trimmed.starts_with('p') {
            self.parse_header_line(trimmed);
            return;
        }

        for token in trimmed.split_whitespace() {
            self.parse_token(token);
        }
    }

    fn parse_header_line(&mut self, line: &str) {
        if self.header.is_some() {
            self.errors.push(ParserError::DuplicateHeader {
                line: self.line_number,
            });
            return;
        }

        let mut values = line.split_whitespace();
        let well_formed = values.next() == Some("p")
            && values.next() == Some("cnf");
        let var_count = values.next().and_then(|value| value.parse::<usize>().ok());
        let clause_count = values.next().and_then(|value| value.parse::<usize>().ok());

        match (well_formed, var_count, clause_count, values.next()) {
            (true, Some(var_count), Some(clause_count), None) => {
                if var_count > Var::max_count() {
                    self.errors.push(ParserError::UnsupportedVariableCount {
                        line: self.line_number,
                        var_count,
                    });
                    return;
                }
                match Formula::new(var_count, clause_count) {
                    Ok(formula) => {
                        self.header = Some(DimacsHeader {
                            var_count,
                            clause_count,
                        });
                        self.formula = Some(formula);
                    }
                    Err(_) => self.errors.push(ParserError::UnsupportedVariableCount {
                        line: self.line_number,
                        var_count,
                    }),
                }
            }
            _ => self.errors.push(ParserError::InvalidHeader {
                line: self.line_number,
                header: line.to_owned(),
            }),
        }
    }

    fn parse_token(&mut self, token: &str) {
        let number: isize = match token.parse() {
            Ok(number) => number,
            Err(_) => {
                self.errors.push(ParserError::UnexpectedInput {
                    line: self.line_number,
                    token: token.to_owned(),
                });
                self.clause_valid = false;
                return;
            }
        };

        if number == 0 {
            self.finish_clause();
            return;
        }

        let num_variables = match self.header {
            Some(header) => header.var_count,
            None => {
                if self.errors.iter().all(|error| *error != ParserError::MissingHeader) {
                    self.errors.push(ParserError::MissingHeader);
                }
                self.clause_valid = false;
                return;
            }
        };

        if number.abs() as usize > num_variables {
            self.errors.push(ParserError::LiteralOutOfRange {
                line: self.line_number,
                literal: number,
                num_variables,
            });
            self.clause_valid = false;
            return;
        }

        self.partial_clause.push(Lit::from_dimacs(number));
    }

    fn finish_clause(&mut self) {
        let cid = self.clause_count;
        self.clause_count += 1;

        let literals = std::mem::replace(&mut self.partial_clause, vec![]);
        let valid = std::mem::replace(&mut self.clause_valid, true);
        if !valid {
            return;
        }

        let formula = match self.formula.as_mut() {
            Some(formula) => formula,
            None => return,
        };

        let clause = Clause::new(literals);
        if clause.is_tautology() {
            return;
        }

        // Apply the assignment fixed by earlier unit clauses: a satisfied
        // clause is dropped, falsified literals are stripped.
        if clause.lits().iter().any(|&lit| formula.value_of(lit) == Some(true)) {
            return;
        }
        let open: Vec<Lit> = clause
            .lits()
            .iter()
            .copied()
            .filter(|&lit| formula.value_of(lit).is_none())
            .collect();

        match open[..] {
            [] => self.errors.push(ParserError::EmptyClause {
                line: self.line_number,
            }),
            [unit] => {
                if let Propagation::Conflict(_) = formula.propagate(unit) {
                    self.errors.push(ParserError::ConflictingUnitClauses {
                        line: self.line_number,
                        literal: unit.to_dimacs(),
                    });
                }
            }
            _ => formula
                .add_clause(cid, open)
                .expect("validated clause insertion cannot fail"),
        }
    }

    fn finish(mut self) -> ParseResult {
        if !self.partial_clause.is_empty() || !self.clause_valid {
            self.errors.push(ParserError::UnterminatedClause {
                line: self.line_number,
            });
        }

        match self.header {
            None => {
                if self.errors.is_empty() {
                    self.errors.push(ParserError::MissingHeader);
                }
            }
            Some(header) => {
                if self.clause_count != header.clause_count {
                    self.errors.push(ParserError::ClauseCount {
                        clause_count: self.clause_count,
                        header_clause_count: header.clause_count,
                    });
                }
            }
        }

        ParseResult {
            formula: if self.errors.is_empty() {
                self.formula
            } else {
                None
            },
            errors: self.errors,
        }
    }
}

/// Write a DIMACS CNF header.
///
/// Can be used with [`write_dimacs_clauses`] to implement incremental writing.
pub fn write_dimacs_header(target: &mut impl io::Write, header: DimacsHeader) -> io::Result<()> {
    writeln!(
        target,
        "p cnf {var_count} {clause_count}",
        var_count = header.var_count,
        clause_count = header.clause_count
    )
}

/// Write an iterator of clauses as headerless DIMACS CNF.
pub fn write_dimacs_clauses(
    target: &mut impl io::Write,
    clauses: impl IntoIterator<Item = impl IntoIterator<Item = impl Borrow<Lit>>>,
) -> io::Result<()> {
    for clause in clauses.into_iter() {
        for lit in clause.into_iter() {
            itoa::write(&mut *target, lit.borrow().to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Write a formula as DIMACS CNF, clauses in id order.
pub fn write_dimacs(target: &mut impl io::Write, formula: &Formula) -> io::Result<()> {
    write_dimacs_header(
        &mut *target,
        DimacsHeader {
            var_count: formula.num_variables(),
            clause_count: formula.len(),
        },
    )?;
    write_dimacs_clauses(
        &mut *target,
        formula.clauses().map(|(_, clause)| clause.lits()),
    )
}
