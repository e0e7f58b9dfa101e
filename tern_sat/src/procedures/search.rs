/*!
The search driver.

A single loop: propagate; on conflict, analyze, backjump, store the learnt
clause and decay activities; on no conflict, consult the restart and
rephasing controllers, simplify and reduce when due, honour assumptions,
and decide.

The focus/stable regime alternates on a tick budget (ticks advance inside
propagation as long clauses are inspected): after
`15,000,000 × changes-so-far` further ticks the regime flips, swapping the
restart controller and the variable decay, and (on entering stable) the
rephasing cycle restarts from its best step.

A one-shot adaptation at 100,000 conflicts may override strategy choices
for the rest of the solve, keyed on the decisions-per-conflict rate and the
number of conflicts reached without any decision.
*/

use crate::db::arena::CRef;
use crate::misc::log::targets;
use crate::restart::ActiveRestart;
use crate::solver::{Regime, Solver};
use crate::structures::clause::ClauseSource;
use crate::structures::literal::Literal;

/// What a bounded search concluded.
pub(crate) enum SearchStatus {
    Satisfiable,
    Unsatisfiable,
    /// A restart, budget, interrupt or strategy change ended the cycle.
    Interrupted,
}

impl Solver {
    /// Search until a restart (or an answer).
    pub(crate) fn search(&mut self) -> SearchStatus {
        debug_assert!(self.ok);
        self.counters.starts += 1;

        let mut learnt_clause: Vec<Literal> = Vec::new();
        let mut decision_made = false;

        if self.config.lcm && self.manager_perform_lcm() && !self.vivify_learnts() {
            return SearchStatus::Unsatisfiable;
        }

        loop {
            if self.exchange.is_some() && self.decision_level() == 0 && !self.import_clauses() {
                return SearchStatus::Unsatisfiable;
            }

            let conflict = self.propagate();

            match conflict {
                Some(conflict) => {
                    self.counters.conflicts += 1;
                    if self.decision_level() == 0 {
                        return SearchStatus::Unsatisfiable;
                    }

                    if !decision_made {
                        self.stats.no_decision_conflicts += 1;
                    }
                    decision_made = false;

                    let backjump_level = self.analyze(conflict, &mut learnt_clause);
                    let lbd = self.lbd_of(&learnt_clause);

                    // Variables of the conflict level whose learnt reason
                    // beat the fresh clause deserve extra activity.
                    if self.regime.focus() && !self.last_decision_level.is_empty() {
                        for i in 0..self.last_decision_level.len() {
                            let literal = self.last_decision_level[i];
                            let reason = self.reason(literal.atom());
                            if self.ca.lbd(reason) < lbd {
                                self.var_bump_activity(literal.atom());
                            }
                        }
                    }

                    self.restart
                        .glucose
                        .update(self.trail.len(), lbd);
                    self.restart.block_restart(self.counters.conflicts);

                    if self.regime.stable() {
                        self.update_best_phase();
                    }

                    self.cancel_until(backjump_level);

                    if learnt_clause.len() == 1 {
                        self.unchecked_enqueue(learnt_clause[0], CRef::UNDEF);
                        self.stats.unit_learnts += 1;
                        self.export_unit(learnt_clause[0]);
                    } else {
                        let cref = self.ca.alloc(&learnt_clause, ClauseSource::Learnt);
                        self.ca.set_lbd(cref, lbd);
                        self.attach_clause(cref);
                        self.cla_bump_activity(cref);
                        self.manager_add(cref);
                        if lbd == 2 {
                            self.stats.glue_learnts += 1;
                        }
                        if learnt_clause.len() == 2 {
                            self.stats.binary_learnts += 1;
                        }
                        self.unchecked_enqueue(learnt_clause[0], cref);
                        self.export_clause_during_search(cref);
                    }

                    self.proof_add_lits(&learnt_clause);

                    self.var_decay_activity();
                    self.cla_decay_activity();

                    if self.counters.conflicts % 10_000 == 0 {
                        self.log_search_progress();
                    }

                    if self.adapt_strategies
                        && self.counters.conflicts == 100_000
                        && self.adapt_solver()
                    {
                        self.cancel_until(0);
                        return SearchStatus::Interrupted;
                    }
                }

                None => {
                    if self.restart.trigger_restart(self.counters.conflicts)
                        || !self.within_budget()
                    {
                        log::trace!(
                            target: targets::RESTART,
                            "Restart after {} conflicts",
                            self.counters.conflicts
                        );
                        self.cancel_until(0);
                        return SearchStatus::Interrupted;
                    }

                    if self.regime.stable() && self.rephasing_due() && self.rephase().is_some() {
                        // Only a walk that satisfied the formula reports.
                        return SearchStatus::Satisfiable;
                    }

                    // Simplify the set of problem clauses.
                    if self.decision_level() == 0 && !self.simplify() {
                        return SearchStatus::Unsatisfiable;
                    }

                    if self.manager_trigger_reduce() {
                        self.manager_reduce();
                    }

                    let mut next = None;
                    while self.decision_level() < self.assumptions.len() {
                        // Honour an outstanding assumption.
                        let p = self.assumptions[self.decision_level()];
                        match self.value_literal(p) {
                            Some(true) => self.new_decision_level(),
                            Some(false) => {
                                self.analyze_final(!p);
                                return SearchStatus::Unsatisfiable;
                            }
                            None => {
                                next = Some(p);
                                break;
                            }
                        }
                    }

                    let next = match next {
                        Some(assumption) => assumption,
                        None => {
                            self.counters.decisions += 1;
                            match self.pick_branch_lit() {
                                Some(decision) => decision,
                                // Every decision atom is assigned: a model.
                                None => return SearchStatus::Satisfiable,
                            }
                        }
                    };

                    if matches!(self.regime, Regime::Focus | Regime::Stable)
                        && self.ticks > self.next_regime_change
                    {
                        self.next_regime_change = self.ticks + self.regime_changes * 15_000_000;
                        self.regime_changes += 1;
                        self.change_regime();
                    }

                    decision_made = true;
                    self.new_decision_level();
                    self.unchecked_enqueue(next, CRef::UNDEF);
                }
            }
        }
    }

    /// Flip between the focus and stable regimes.
    pub(crate) fn change_regime(&mut self) {
        match self.regime {
            Regime::Stable => {
                log::debug!(target: targets::SEARCH, "Focus");
                self.restart.active = ActiveRestart::Glucose;
                self.var_decay = 0.95;
                self.regime = Regime::Focus;
                self.phases_used.push_str(") - Focus ");
            }
            Regime::Focus => {
                log::debug!(target: targets::SEARCH, "Stable");
                self.restart.active = ActiveRestart::Luby;
                self.var_decay = 0.75;
                self.regime = Regime::Stable;
                self.phase_reset();
                self.phases_used.push_str(" - Stable(");
            }
            _ => {}
        }
    }

    /// One-shot strategy retune. True if anything changed.
    pub(crate) fn adapt_solver(&mut self) -> bool {
        self.adapt_strategies = false;
        let decisions_per_conflict =
            self.counters.decisions as f64 / self.counters.conflicts as f64;

        if decisions_per_conflict <= 1.2 {
            log::info!(target: targets::SEARCH, "Adjusting for low decision levels");
            self.restart.active = ActiveRestart::Glucose;
            self.regime = Regime::OnlyFocus;
            self.manager.core_ub = 5;
            return true;
        }

        if self.stats.no_decision_conflicts < 30_000 {
            log::info!(
                target: targets::SEARCH,
                "Adjusting for low successive conflicts"
            );
            self.restart.active = ActiveRestart::Luby;
            self.regime = Regime::OnlyFocus;
            self.var_decay = 0.999;
            return true;
        }

        false
    }

    fn log_search_progress(&self) {
        log::info!(
            target: targets::SEARCH,
            "c {:>12} conflicts | {:>8} restarts | {:>6} reduces | ({}/{}/{}) learnts | {:>10} removed | {:.4}% progress",
            self.counters.conflicts,
            self.restart.total_restarts(),
            self.manager.reduce_count,
            self.learnts_core.len(),
            self.learnts_tier2.len(),
            self.learnts_local.len(),
            self.manager.removed_count,
            self.progress_estimate() * 100.0,
        );
    }
}
