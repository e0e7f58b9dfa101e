/*!
First-UIP conflict analysis, with learnt-clause minimisation.

Starting from the conflicting clause, analysis resolves backwards along
reasons over the trail, marking each variable once. Literals below the
current decision level join the learnt clause; literals at the current
level count towards the unresolved path. When one path remains, its literal
is the first unique implication point, and its negation takes position 0 of
the learnt clause.

Binary reasons are normalised on the way: a size-2 clause whose first
literal is false is swapped so the implied literal stays second, an
invariant the binary watch scheme relies on.

The learnt clause is then minimised:

- **Deep** (ccmin 2): a literal is dropped when its reason recursively
  resolves into the clause, using an abstract-level bitmap to cut hopeless
  branches early.
- **Basic** (ccmin 1): a literal is dropped when every literal of its
  reason is marked or proven.
- **Binary resolution**: for glue-ish clauses (LBD ≤ 6, fewer than 30
  literals), literals implied by binary clauses over the negated UIP are
  resolved away.

Activity side effects: every marked variable is bumped; in stable regimes
the literals of each contributing reason are bumped too; in focus regimes
variables of the last decision level whose (learnt) reason had a lower LBD
than the fresh clause get an extra bump after analysis.

With self-subsumption enabled, a reason containing more current-level
literals than the path requires is shrunk in place (detach, shrink,
re-attach, proof record).

[analyze_final](crate::solver::Solver::analyze_final) specialises the walk
for a conflicting assumption, collecting the set of assumptions that imply
its negation.
*/

use crate::config::CcMinMode;
use crate::db::arena::CRef;
use crate::misc::log::targets;
use crate::solver::Solver;
use crate::structures::clause;
use crate::structures::literal::Literal;

impl Solver {
    /// Analyze a conflict, filling `learnt` with an asserting clause.
    ///
    /// On return `learnt[0]` asserts at the returned backjump level, and
    /// `learnt[1]` (if any) carries the greatest level of the rest.
    pub(crate) fn analyze(&mut self, mut conflict: CRef, learnt: &mut Vec<Literal>) -> usize {
        let mut path_count: i32 = 0;
        let mut pivot: Option<Literal> = None;
        let mut index = self.trail.len();

        learnt.clear();
        learnt.push(Literal::UNDEF); // room for the asserting literal
        self.last_decision_level.clear();

        loop {
            debug_assert!(conflict != CRef::UNDEF, "a UIP before the conflict");

            // Keep the implied literal of a binary reason second.
            if pivot.is_some() && self.ca.size(conflict) == 2 {
                let first = self.ca.lits(conflict)[0];
                if self.value_literal(first) == Some(false) {
                    debug_assert!(self.value_literal(self.ca.lits(conflict)[1]) == Some(true));
                    self.ca.lits_mut(conflict).swap(0, 1);
                }
            }

            if self.ca.learnt(conflict) {
                self.manager_update_clause(conflict, true);
                self.export_clause_during_analysis(conflict);
            }

            let start = if pivot.is_none() { 0 } else { 1 };
            let size = self.ca.size(conflict);

            let (shrink_reason, current_level_lits) = if self.config.self_subsumption {
                self.self_subsumption_check(conflict, start, path_count, learnt.len())
            } else {
                (false, 0)
            };

            for j in start..size {
                let q = self.ca.lits(conflict)[j];
                let atom = q.atom();

                if !self.seen[atom] && self.level(atom) > 0 {
                    self.var_bump_activity(atom);
                    if self.regime.stable() {
                        self.bump_reason_literals(q);
                    }

                    self.seen[atom] = true;

                    if self.level(atom) >= self.decision_level() {
                        path_count += 1;
                        let reason = self.reason(atom);
                        if reason != CRef::UNDEF && self.ca.learnt(reason) {
                            self.last_decision_level.push(q);
                        }
                    } else {
                        learnt.push(q);
                    }
                }
            }

            if shrink_reason && current_level_lits > 1 {
                self.self_subsume(conflict);
            }

            // Select the next clause to look at.
            loop {
                index -= 1;
                if self.seen[self.trail[index].atom()] {
                    break;
                }
            }
            let p = self.trail[index];
            conflict = self.reason(p.atom());
            self.seen[p.atom()] = false;
            pivot = Some(p);
            path_count -= 1;
            if path_count == 0 {
                break;
            }
        }
        learnt[0] = !pivot.expect("the first UIP");

        // Minimise.
        self.analyze_toclear.clear();
        self.analyze_toclear.extend_from_slice(learnt);
        match self.config.ccmin_mode {
            CcMinMode::Deep => {
                let mut abstract_levels = 0u32;
                for i in 1..learnt.len() {
                    // An abstraction of the levels involved in the conflict.
                    abstract_levels |= self.abstract_level(learnt[i].atom());
                }

                let mut kept = 1;
                for i in 1..learnt.len() {
                    let literal = learnt[i];
                    if self.reason(literal.atom()) == CRef::UNDEF
                        || !self.literal_redundant(literal, abstract_levels)
                    {
                        learnt[kept] = literal;
                        kept += 1;
                    }
                }
                learnt.truncate(kept);
            }

            CcMinMode::Basic => {
                let mut kept = 1;
                for i in 1..learnt.len() {
                    let literal = learnt[i];
                    let reason = self.reason(literal.atom());
                    if reason == CRef::UNDEF {
                        learnt[kept] = literal;
                        kept += 1;
                        continue;
                    }
                    let size = self.ca.size(reason);
                    let start = if size == 2 { 0 } else { 1 };
                    let mut required = false;
                    for k in start..size {
                        let q = self.ca.lits(reason)[k];
                        if !self.seen[q.atom()] && self.level(q.atom()) > 0 {
                            required = true;
                            break;
                        }
                    }
                    if required {
                        learnt[kept] = literal;
                        kept += 1;
                    }
                }
                learnt.truncate(kept);
            }

            CcMinMode::None => {}
        }

        if self.config.min_with_binary_resolution && learnt.len() < 30 {
            self.minimize_with_binary_resolution(learnt);
        }

        // Find the backjump level, swapping its literal into position 1.
        let backjump_level = if learnt.len() == 1 {
            0
        } else {
            let mut max_at = 1;
            for k in 2..learnt.len() {
                if self.level(learnt[k].atom()) > self.level(learnt[max_at].atom()) {
                    max_at = k;
                }
            }
            learnt.swap(1, max_at);
            self.level(learnt[1].atom())
        };

        for i in 0..self.analyze_toclear.len() {
            let atom = self.analyze_toclear[i].atom();
            self.seen[atom] = false;
        }

        log::trace!(
            target: targets::ANALYSIS,
            "Learnt {} asserting at {backjump_level}",
            clause::as_dimacs(learnt)
        );
        backjump_level
    }

    /// Whether `literal` is redundant in the clause under construction:
    /// its reason, recursively, is contained in marked or proven literals.
    ///
    /// `abstract_levels` aborts early on reaching a level that cannot be
    /// resolved away.
    fn literal_redundant(&mut self, literal: Literal, abstract_levels: u32) -> bool {
        self.analyze_stack.clear();
        self.analyze_stack.push(literal);
        let top = self.analyze_toclear.len();

        while let Some(on_stack) = self.analyze_stack.pop() {
            let reason = self.reason(on_stack.atom());
            debug_assert!(reason != CRef::UNDEF);

            if self.ca.size(reason) == 2 {
                let first = self.ca.lits(reason)[0];
                if self.value_literal(first) == Some(false) {
                    self.ca.lits_mut(reason).swap(0, 1);
                }
            }

            let size = self.ca.size(reason);
            for i in 1..size {
                let q = self.ca.lits(reason)[i];
                let atom = q.atom();
                if !self.seen[atom] && self.level(atom) > 0 {
                    if self.reason(atom) != CRef::UNDEF
                        && (self.abstract_level(atom) & abstract_levels) != 0
                    {
                        self.seen[atom] = true;
                        self.analyze_stack.push(q);
                        self.analyze_toclear.push(q);
                    } else {
                        // Unwind the marks made on this attempt.
                        for j in top..self.analyze_toclear.len() {
                            self.seen[self.analyze_toclear[j].atom()] = false;
                        }
                        self.analyze_toclear.truncate(top);
                        return false;
                    }
                }
            }
        }

        true
    }

    /// Resolve away learnt literals implied by binary clauses over the
    /// negated UIP.
    fn minimize_with_binary_resolution(&mut self, learnt: &mut Vec<Literal>) {
        let lbd = self.lbd_of(learnt);
        if lbd > 6 {
            return;
        }

        let uip = !learnt[0];
        self.stamp_flag += 1;
        let flag = self.stamp_flag;
        for i in 1..learnt.len() {
            self.stamp[learnt[i].atom()] = flag;
        }

        let mut removable = 0;
        for k in 0..self.watches_bin.occs(uip).len() {
            let implied = self.watches_bin.occs(uip)[k].blocker;
            if self.stamp[implied.atom()] == flag && self.value_literal(implied) == Some(true) {
                removable += 1;
                self.stamp[implied.atom()] = flag - 1;
            }
        }

        if removable > 0 {
            self.stats.binary_resolutions += 1;
            let mut back = learnt.len() - 1;
            let mut i = 1;
            while i < learnt.len() - removable {
                if self.stamp[learnt[i].atom()] != flag {
                    learnt.swap(i, back);
                    back -= 1;
                } else {
                    i += 1;
                }
            }
            learnt.truncate(learnt.len() - removable);
        }
    }

    /// Count how the reason relates to the marks so far; the first value
    /// says whether the reason is strictly contained and may be shrunk.
    fn self_subsumption_check(
        &self,
        conflict: CRef,
        start: usize,
        path_count: i32,
        learnt_len: usize,
    ) -> (bool, usize) {
        let mut current_level = 0;
        let mut seen_current = 0;
        let mut seen_earlier = 0;
        let size = self.ca.size(conflict);
        for j in start..size {
            let q = self.ca.lits(conflict)[j];
            let level = self.level(q.atom());
            if level >= self.decision_level() {
                current_level += 1;
            }
            if self.seen[q.atom()] && level >= self.decision_level() {
                seen_current += 1;
            }
            if self.seen[q.atom()] && level < self.decision_level() && level > 0 {
                seen_earlier += 1;
            }
        }
        let shrink = seen_current >= path_count
            && path_count > 0
            && seen_earlier + 1 >= learnt_len;
        (shrink, current_level)
    }

    /// Drop one current-level literal from the reason, in place.
    fn self_subsume(&mut self, conflict: CRef) {
        self.stats.self_subsumptions += 1;

        let mut at = 0;
        for j in 2..self.ca.size(conflict) {
            if self.level(self.ca.lits(conflict)[j].atom()) >= self.decision_level() {
                at = j;
                break;
            }
        }

        self.detach_clause(conflict, true);
        let size = self.ca.size(conflict);
        {
            let lits = self.ca.lits_mut(conflict);
            lits[0] = lits[at];
            lits[at] = lits[size - 1];
        }
        self.ca.shrink(conflict, size - 1);
        self.proof_add(conflict);
        self.attach_clause(conflict);
    }

    /// Bump the body of the reason which implied `literal`.
    fn bump_reason_literals(&mut self, literal: Literal) {
        let reason = self.reason(literal.atom());
        if reason == CRef::UNDEF {
            return;
        }
        let size = self.ca.size(reason);
        for i in 1..size {
            let atom = self.ca.lits(reason)[i].atom();
            self.var_bump_activity(atom);
        }
    }

    /// Express a final conflict on `p` in terms of the assumptions that
    /// forced it, into the solver's conflict vector.
    pub(crate) fn analyze_final(&mut self, p: Literal) {
        self.conflict.clear();
        self.conflict.push(p);

        if self.decision_level() == 0 {
            return;
        }

        self.seen[p.atom()] = true;

        for i in (self.trail_lim[0]..self.trail.len()).rev() {
            let atom = self.trail[i].atom();
            if !self.seen[atom] {
                continue;
            }
            let reason = self.reason(atom);
            if reason == CRef::UNDEF {
                debug_assert!(self.level(atom) > 0);
                let negated = !self.trail[i];
                self.conflict.push(negated);
            } else {
                let size = self.ca.size(reason);
                // The implied literal of a binary clause may sit first.
                let start = if size == 2 { 0 } else { 1 };
                for j in start..size {
                    let q = self.ca.lits(reason)[j];
                    if self.level(q.atom()) > 0 {
                        self.seen[q.atom()] = true;
                    }
                }
            }
            self.seen[atom] = false;
        }

        self.seen[p.atom()] = false;
    }
}
