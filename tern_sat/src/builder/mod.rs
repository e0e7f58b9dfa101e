/*!
Formula construction.

Atoms are created in order and never destroyed; every per-atom store grows
in step. Clauses added here are normalised first: literals are sorted,
duplicates collapse, tautologies vanish, and literals already false at
level 0 are dropped (with the strengthening recorded in the proof). What
remains is enqueued (units), or stored and attached.
*/

pub mod dimacs;

use crate::db::arena::CRef;
use crate::misc::log::targets;
use crate::solver::{Solver, VarData};
use crate::structures::atom::Atom;
use crate::structures::clause::ClauseSource;
use crate::structures::literal::Literal;
use crate::types::err::BuildError;

impl Solver {
    /// Add a fresh atom, eligible for decisions.
    pub fn new_atom(&mut self) -> Atom {
        let atom = self.atom_count();

        self.watches.init_atom();
        self.watches_bin.init_atom();
        self.unary_watches.init_atom();

        self.assigns.push(None);
        self.vardata.push(VarData::new(CRef::UNDEF, 0));
        self.seen.push(false);
        self.saved_phase.push(false);
        self.target_phase.push(None);
        self.stamp.push(0);
        self.decision.push(false);

        let activity = if self.config.rnd_init_act {
            self.rng.next_double() * 0.00001
        } else {
            0.0
        };
        self.order_heap.reserve(atom);
        self.order_heap.revalue(atom, activity);

        self.set_decision_atom(atom, true);
        atom
    }

    /// Grow the atom space to cover `count` atoms.
    pub fn ensure_atom_count(&mut self, count: usize) {
        while self.atom_count() < count {
            self.new_atom();
        }
    }

    /// Add a clause over existing atoms.
    ///
    /// `Err` reports that the formula is now unsatisfiable by unit
    /// propagation alone; the solver is conflicting from here on.
    pub fn add_clause(&mut self, mut literals: Vec<Literal>) -> Result<(), BuildError> {
        debug_assert!(self.decision_level() == 0);
        if !self.ok {
            return Err(BuildError::Unsatisfiable);
        }

        literals.sort();
        let original = if self.proof.is_some() {
            Some(literals.clone())
        } else {
            None
        };

        // Normalise against the level-0 valuation.
        let mut strengthened = false;
        let mut write = 0;
        let mut previous = None;
        for read in 0..literals.len() {
            let literal = literals[read];
            match self.value_literal(literal) {
                Some(true) => return Ok(()),
                Some(false) => {
                    strengthened = true;
                    continue;
                }
                None => {}
            }
            if previous == Some(!literal) {
                // A tautology constrains nothing.
                return Ok(());
            }
            if previous == Some(literal) {
                continue;
            }
            previous = Some(literal);
            literals[write] = literal;
            write += 1;
        }
        literals.truncate(write);

        if strengthened {
            if let Some(original) = original {
                self.proof_add_lits(&literals);
                self.proof_delete_lits(&original);
            }
        }

        match literals.len() {
            0 => {
                log::debug!(target: targets::CLAUSE_DB, "Empty clause added");
                self.ok = false;
                Err(BuildError::Unsatisfiable)
            }
            1 => {
                self.unchecked_enqueue(literals[0], CRef::UNDEF);
                self.ok = self.propagate().is_none();
                match self.ok {
                    true => Ok(()),
                    false => Err(BuildError::Unsatisfiable),
                }
            }
            _ => {
                let cref = self.ca.alloc(&literals, ClauseSource::Original);
                self.clauses.push(cref);
                self.attach_clause(cref);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn lits(ints: &[i32]) -> Vec<Literal> {
        ints.iter().map(|&i| Literal::from_dimacs(i)).collect()
    }

    #[test]
    fn tautologies_vanish() {
        let mut solver = Solver::new(Config::default());
        solver.ensure_atom_count(2);
        assert!(solver.add_clause(lits(&[1, -1, 2])).is_ok());
        assert_eq!(solver.clause_count(), 0);
    }

    #[test]
    fn duplicates_collapse() {
        let mut solver = Solver::new(Config::default());
        solver.ensure_atom_count(2);
        assert!(solver.add_clause(lits(&[1, 1, 2])).is_ok());
        assert_eq!(solver.clause_count(), 1);
    }

    #[test]
    fn units_propagate_on_addition() {
        let mut solver = Solver::new(Config::default());
        solver.ensure_atom_count(2);
        assert!(solver.add_clause(lits(&[-1, 2])).is_ok());
        assert!(solver.add_clause(lits(&[1])).is_ok());
        assert_eq!(solver.value(0), Some(true));
        assert_eq!(solver.value(1), Some(true));
    }

    #[test]
    fn contradictory_units() {
        let mut solver = Solver::new(Config::default());
        solver.ensure_atom_count(1);
        assert!(solver.add_clause(lits(&[1])).is_ok());
        assert!(solver.add_clause(lits(&[-1])).is_err());
        assert!(!solver.okay());
    }
}
