/*!
The solve entry points.

[solve](crate::solver::Solver::solve) and the assumption-taking variants
wrap [search](crate::procedures::search) in budget checks and reporting.
Each search cycle ends with a restart (or an answer); the loop hands
control back until an answer arrives, a budget runs out, or the interrupt
flag is raised.

On a satisfiable outcome the model is read from the trail, or, when the
local-search engine closed the solve, from its assignment with level-0
facts kept from the trail. On an unsatisfiable outcome under assumptions,
the final conflict is available in terms of the assumptions; with a proof
writer attached, the proof is concluded with the empty clause.
*/

use crate::misc::log::targets;
use crate::procedures::search::SearchStatus;
use crate::reports::Report;
use crate::solver::Solver;
use crate::structures::literal::Literal;

impl Solver {
    /// Determine the satisfiability of the formula.
    pub fn solve(&mut self) -> Report {
        self.budget_off();
        self.assumptions.clear();
        self.solve_internal()
    }

    /// Determine satisfiability under `assumptions`.
    pub fn solve_with(&mut self, assumptions: &[Literal]) -> Report {
        self.budget_off();
        self.assumptions.clear();
        self.assumptions.extend_from_slice(assumptions);
        self.solve_internal()
    }

    /// As [solve_with](Solver::solve_with), respecting any budgets set.
    pub fn solve_limited(&mut self, assumptions: &[Literal]) -> Report {
        self.assumptions.clear();
        self.assumptions.extend_from_slice(assumptions);
        self.solve_internal()
    }

    fn solve_internal(&mut self) -> Report {
        self.model.clear();
        self.conflict.clear();
        if !self.ok {
            if let Some(proof) = self.proof.as_mut() {
                proof.conclude_unsatisfiable();
            }
            return Report::Unsatisfiable;
        }

        self.counters.solves += 1;
        self.solved_by_walk = false;
        self.phase_initialize();
        self.trail_saving.initialize(self.atom_count());
        self.manager_init();

        let mut status = None;
        while status.is_none() {
            match self.search() {
                SearchStatus::Satisfiable => status = Some(true),
                SearchStatus::Unsatisfiable => status = Some(false),
                SearchStatus::Interrupted => {
                    if !self.within_budget() {
                        log::debug!(target: targets::SEARCH, "Budget exhausted");
                        break;
                    }
                }
            }
        }

        let report = match status {
            Some(true) => {
                self.extract_model();
                Report::Satisfiable
            }
            Some(false) => {
                if let Some(proof) = self.proof.as_mut() {
                    proof.conclude_unsatisfiable();
                }
                if self.conflict.is_empty() {
                    self.ok = false;
                }
                Report::Unsatisfiable
            }
            None => Report::Unknown,
        };

        self.cancel_until(0);
        report
    }

    fn extract_model(&mut self) {
        self.model.resize(self.atom_count(), None);
        if self.solved_by_walk {
            log::info!(target: targets::SEARCH, "Solved by the local-search engine");
            for atom in 0..self.atom_count() {
                // Level-0 facts hold in every model; the walk fills the rest.
                self.model[atom] = match self.value(atom) {
                    Some(value) if self.level(atom) == 0 => Some(value),
                    _ => Some(self.walk_solution[atom]),
                };
            }
        } else {
            for atom in 0..self.atom_count() {
                self.model[atom] = self.value(atom);
            }
        }
    }
}
