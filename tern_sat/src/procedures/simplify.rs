//! Level-0 simplification.
//!
//! With fresh top-level facts on the trail, clauses satisfied at level 0
//! are removed outright from the learnt tiers, the purgatory and
//! (optionally) the problem clauses. Skipped while no new facts have
//! arrived or a propagation allowance remains outstanding.

use crate::db::arena::CRef;
use crate::misc::log::targets;
use crate::solver::Solver;

impl Solver {
    /// Simplify the clause database against the top-level assignment.
    ///
    /// False means the formula is unsatisfiable.
    pub(crate) fn simplify(&mut self) -> bool {
        debug_assert!(self.decision_level() == 0);

        self.trail_saving.reset();

        if !self.ok || self.propagate().is_some() {
            self.ok = false;
            return false;
        }

        if self.simp_db_assigns == Some(self.trail.len()) || self.simp_db_props > 0 {
            return true;
        }

        log::debug!(
            target: targets::CLAUSE_DB,
            "Simplify at {} top-level assignments",
            self.trail.len()
        );

        let learnts = std::mem::take(&mut self.learnts_core);
        self.learnts_core = self.remove_satisfied_from(learnts);
        let learnts = std::mem::take(&mut self.learnts_tier2);
        self.learnts_tier2 = self.remove_satisfied_from(learnts);
        let unary = std::mem::take(&mut self.unary_watched_clauses);
        self.unary_watched_clauses = self.remove_satisfied_from(unary);
        if self.remove_satisfied {
            let clauses = std::mem::take(&mut self.clauses);
            self.clauses = self.remove_satisfied_from(clauses);
        }
        self.check_garbage();
        self.rebuild_order_heap();

        self.simp_db_assigns = Some(self.trail.len());

        true
    }

    /// Remove the clauses of `list` satisfied at level 0.
    pub(crate) fn remove_satisfied_from(&mut self, mut list: Vec<CRef>) -> Vec<CRef> {
        let mut kept = 0;
        for i in 0..list.len() {
            let cref = list[i];
            if self.satisfied(cref) {
                self.remove_clause(cref, self.ca.one_watched(cref));
            } else {
                list[kept] = cref;
                kept += 1;
            }
        }
        list.truncate(kept);
        list
    }

    /// Rebuild the decision heap over unassigned decision atoms.
    pub(crate) fn rebuild_order_heap(&mut self) {
        let mut atoms = Vec::new();
        for atom in 0..self.atom_count() {
            if self.decision[atom] && self.value(atom).is_none() {
                atoms.push(atom);
            }
        }
        self.order_heap.rebuild(atoms);
    }
}
