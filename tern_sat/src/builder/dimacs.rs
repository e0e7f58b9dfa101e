/*!
DIMACS CNF parsing.

The reader accepts the usual format: comment lines starting with `c`, a
problem line `p cnf <atoms> <clauses>`, and clauses as whitespace-separated
signed integers terminated by `0`. A `%` line ends the body (as in the
SATLIB corpus). Literals beyond the declared atom count grow the atom
space, with a note in the log.
*/

use std::io::BufRead;

use crate::misc::log::targets;
use crate::solver::Solver;
use crate::structures::literal::Literal;
use crate::types::err::{self, ErrorKind};

impl Solver {
    /// Read a DIMACS formula into the solver.
    ///
    /// `Err(Build(Unsatisfiable))` reports unsatisfiability detected during
    /// the read; parse errors report the offending line.
    pub fn read_dimacs(&mut self, reader: impl BufRead) -> Result<(), ErrorKind> {
        let mut declared_clauses: Option<usize> = None;
        let mut clause: Vec<Literal> = Vec::new();
        let mut added = 0usize;

        for (number, line) in reader.lines().enumerate() {
            let line = line.map_err(|_| err::ParseError::Io)?;
            let line = line.trim();

            if line.starts_with('c') || line.is_empty() {
                continue;
            }
            if line.starts_with('%') {
                break;
            }

            if let Some(problem) = line.strip_prefix('p') {
                let mut fields = problem.split_whitespace();
                if fields.next() != Some("cnf") {
                    return Err(err::ParseError::ProblemSpecification.into());
                }
                let atoms: usize = fields
                    .next()
                    .and_then(|f| f.parse().ok())
                    .ok_or(err::ParseError::ProblemSpecification)?;
                let clauses: usize = fields
                    .next()
                    .and_then(|f| f.parse().ok())
                    .ok_or(err::ParseError::ProblemSpecification)?;
                self.ensure_atom_count(atoms);
                declared_clauses = Some(clauses);
                continue;
            }

            for field in line.split_whitespace() {
                let int: i32 = field
                    .parse()
                    .map_err(|_| err::ParseError::Line(number + 1))?;
                if int == 0 {
                    added += 1;
                    let finished = std::mem::take(&mut clause);
                    match self.add_clause(finished) {
                        Ok(()) => {}
                        Err(err::BuildError::Unsatisfiable) => {
                            return Err(err::BuildError::Unsatisfiable.into());
                        }
                    }
                } else {
                    let literal = Literal::from_dimacs(int);
                    if literal.atom() >= self.atom_count() {
                        log::warn!(
                            target: targets::CLAUSE_DB,
                            "Atom {} beyond the problem line",
                            literal.atom() + 1
                        );
                        self.ensure_atom_count(literal.atom() + 1);
                    }
                    clause.push(literal);
                }
            }
        }

        if !clause.is_empty() {
            // A final clause without its terminating zero.
            added += 1;
            self.add_clause(clause)
                .map_err(|_| ErrorKind::from(err::BuildError::Unsatisfiable))?;
        }

        if let Some(declared) = declared_clauses {
            if declared != added {
                log::warn!(
                    target: targets::CLAUSE_DB,
                    "Problem line declared {declared} clauses, read {added}"
                );
            }
        } else {
            log::warn!(target: targets::CLAUSE_DB, "No problem line");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::reports::Report;

    #[test]
    fn reads_a_formula() {
        let mut solver = Solver::new(Config::default());
        let dimacs = "c a comment\np cnf 3 3\n1 2 0\n-1 2 0\n-2 3 0\n";
        assert!(solver.read_dimacs(dimacs.as_bytes()).is_ok());
        assert_eq!(solver.atom_count(), 3);
        assert_eq!(solver.clause_count(), 3);
    }

    #[test]
    fn unsatisfiable_at_parse() {
        let mut solver = Solver::new(Config::default());
        let dimacs = "p cnf 1 2\n1 0\n-1 0\n";
        assert_eq!(
            solver.read_dimacs(dimacs.as_bytes()),
            Err(ErrorKind::Build(err::BuildError::Unsatisfiable))
        );
        assert!(!solver.okay());
    }

    #[test]
    fn clauses_may_span_lines() {
        let mut solver = Solver::new(Config::default());
        let dimacs = "p cnf 2 1\n1\n2 0\n";
        assert!(solver.read_dimacs(dimacs.as_bytes()).is_ok());
        assert_eq!(solver.clause_count(), 1);
        assert_eq!(solver.solve(), Report::Satisfiable);
    }

    #[test]
    fn satlib_percent_ending() {
        let mut solver = Solver::new(Config::default());
        let dimacs = "p cnf 2 2\n1 2 0\n-1 2 0\n%\n0\n";
        assert!(solver.read_dimacs(dimacs.as_bytes()).is_ok());
        assert_eq!(solver.clause_count(), 2);
    }
}
