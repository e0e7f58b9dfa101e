/*!
Learnt-clause vivification (LCM).

Runs between restart cycles on the manager's schedule. Each eligible learnt
clause is probed without disturbing the real search state: the trail length
is snapshotted, each unassigned literal of the clause is enqueued negated
and propagated through a pared-down propagator (no activity, no statistics,
no imported clauses), and whenever the probe hits a conflict or finds a
literal of the clause already true, a pared-down analysis extracts a
shorter clause. The trail is then unwound to the snapshot.

Only the second half of each list (by reduction priority) is probed, and a
clause is probed once in its life; the `simplified` flag records it.

A clause vivified to a unit is enqueued at level 0 and propagated for real;
a conflict there makes the formula unsatisfiable. Shrunk clauses are
re-stamped in the proof and may be promoted across tiers via the manager.
*/

use crate::db::arena::{CRef, Tier};
use crate::db::manager::ManagerMode;
use crate::db::watches::Watcher;
use crate::misc::log::targets;
use crate::solver::Solver;
use crate::structures::literal::Literal;

impl Solver {
    /// Vivify the learnt database. False means the formula is
    /// unsatisfiable.
    pub(crate) fn vivify_learnts(&mut self) -> bool {
        self.trail_saving.reset();

        if !self.ok || self.propagate().is_some() {
            self.ok = false;
            return false;
        }

        let clauses = std::mem::take(&mut self.clauses);
        self.clauses = self.remove_satisfied_from(clauses);

        let core = std::mem::take(&mut self.learnts_core);
        let (core, ok) = self.vivify_set(core);
        self.learnts_core = core;
        if !ok {
            return false;
        }

        let tier2 = std::mem::take(&mut self.learnts_tier2);
        let (tier2, ok) = self.vivify_set(tier2);
        self.learnts_tier2 = tier2;
        if !ok {
            return false;
        }

        // Unit fallout may have freed clauses in any list.
        let arena = &self.ca;
        self.learnts_core.retain(|&cref| !arena.removed(cref));
        self.learnts_tier2.retain(|&cref| !arena.removed(cref));
        self.learnts_local.retain(|&cref| !arena.removed(cref));

        self.check_garbage();
        true
    }

    /// Probe the clauses of `list`, shrinking in place where possible.
    fn vivify_set(&mut self, mut list: Vec<CRef>) -> (Vec<CRef>, bool) {
        if self.manager.mode == ManagerMode::Glucose {
            // Priority order so the untouched half is the better half.
            let arena = &self.ca;
            list.sort_by(|&x, &y| crate::db::manager::reduce_order(arena, x, y));
        }

        let half = list.len() / 2;
        let mut kept = 0;

        for at in 0..list.len() {
            let cref = list[at];
            if self.ca.removed(cref) {
                continue;
            }
            if self.ca.imported(cref) {
                list[kept] = cref;
                kept += 1;
                continue;
            }

            let mut satisfied = false;
            let mut has_false = false;
            for i in 0..self.ca.size(cref) {
                match self.value_literal(self.ca.lits(cref)[i]) {
                    Some(true) => {
                        satisfied = true;
                        break;
                    }
                    Some(false) => has_false = true,
                    None => {}
                }
            }

            if satisfied {
                self.remove_clause(cref, false);
                continue;
            }

            self.detach_clause(cref, true);

            if has_false {
                // Strip literals settled false at level 0.
                let mut write = 0;
                let size = self.ca.size(cref);
                for read in 0..size {
                    let literal = self.ca.lits(cref)[read];
                    if self.value_literal(literal) != Some(false) {
                        self.ca.lits_mut(cref)[write] = literal;
                        write += 1;
                    }
                }
                self.ca.shrink(cref, write);
                self.proof_add(cref);
            }

            if at < half || self.ca.simplified(cref) {
                self.attach_clause(cref);
                list[kept] = cref;
                kept += 1;
                continue;
            }

            let before = self.ca.size(cref);
            debug_assert!(before > 1);
            self.vivify_clause(cref);
            let after = self.ca.size(cref);

            if before > after {
                self.stats.lcm_shrunk += 1;
                self.proof_add(cref);
            }

            if after == 1 {
                // The clause vivified to a unit: settle it for real.
                let unit = self.ca.lits(cref)[0];
                self.unchecked_enqueue(unit, CRef::UNDEF);
                if self.propagate().is_some() {
                    self.ok = false;
                    // The unprobed tail stays listed.
                    let mut rest = list[at + 1..].to_vec();
                    list.truncate(kept);
                    list.append(&mut rest);
                    return (list, false);
                }
                self.ca.free(cref);
            } else {
                self.attach_clause(cref);
                list[kept] = cref;
                kept += 1;
                let update = match self.manager.mode {
                    ManagerMode::Glucose => true,
                    ManagerMode::Tiers => self.ca.location(cref) == Tier::Tier2,
                };
                if self.config.lcm_update_lbd && update {
                    self.manager_update_clause(cref, false);
                }
                self.ca.set_simplified(cref, true);
            }
        }

        list.truncate(kept);
        (list, true)
    }

    /// Probe one clause against its own negated literals.
    fn vivify_clause(&mut self, cref: CRef) {
        self.stats.lcm_tested += 1;
        log::trace!(target: targets::VIVIFY, "Probing {cref:?}");

        self.trail_record = self.trail.len();

        let mut conflict = None;
        let mut true_confl = false;
        let mut write = 0;

        let size = self.ca.size(cref);
        for read in 0..size {
            let literal = self.ca.lits(cref)[read];
            match self.value_literal(literal) {
                None => {
                    self.probe_enqueue(!literal, CRef::UNDEF);
                    let lits = self.ca.lits_mut(cref);
                    lits[write] = literal;
                    write += 1;
                    conflict = self.probe_propagate();
                    if conflict.is_some() {
                        break;
                    }
                }
                Some(true) => {
                    // The probe itself implies a literal of the clause.
                    let lits = self.ca.lits_mut(cref);
                    lits[write] = literal;
                    write += 1;
                    true_confl = true;
                    conflict = Some(self.reason(literal.atom()));
                    break;
                }
                Some(false) => {}
            }
        }
        self.ca.shrink(cref, write);
        if self.config.lcm_update_lbd && self.ca.lbd(cref) as usize > self.ca.size(cref) {
            self.ca.set_lbd(cref, self.ca.size(cref) as u32);
        }

        if let Some(seed) = conflict {
            self.vivify_learnt.clear();
            if true_confl {
                let last = self.ca.lits(cref)[self.ca.size(cref) - 1];
                self.vivify_learnt.push(last);
            }
            self.probe_analyze(seed, true_confl);

            if self.vivify_learnt.len() < self.ca.size(cref) {
                let shortened = self.vivify_learnt.len();
                for i in 0..shortened {
                    let literal = self.vivify_learnt[i];
                    self.ca.lits_mut(cref)[i] = literal;
                }
                self.ca.shrink(cref, shortened);
            }
        }

        self.unwind_probe();
    }

    /// Analysis within the probe scope: walk reasons back from `conflict`,
    /// keeping literals whose reasons lie outside the probe.
    fn probe_analyze(&mut self, mut conflict: CRef, true_confl: bool) {
        let mut path_count: i32 = 0;
        let mut pivot: Option<Literal> = None;
        let mut index = self.trail.len();

        loop {
            if conflict != CRef::UNDEF {
                if pivot.is_some() && self.ca.size(conflict) == 2 {
                    let first = self.ca.lits(conflict)[0];
                    if self.value_literal(first) == Some(false) {
                        self.ca.lits_mut(conflict).swap(0, 1);
                    }
                }

                let start = if pivot.is_none() && !true_confl { 0 } else { 1 };
                let size = self.ca.size(conflict);
                for j in start..size {
                    let q = self.ca.lits(conflict)[j];
                    if !self.seen[q.atom()] {
                        self.seen[q.atom()] = true;
                        path_count += 1;
                    }
                }
            } else {
                let p = pivot.expect("a reason-free literal has a pivot");
                self.vivify_learnt.push(!p);
            }

            if path_count == 0 {
                break;
            }

            // Select the next literal to look at.
            loop {
                index -= 1;
                if self.seen[self.trail[index].atom()] {
                    break;
                }
            }
            // Reasons from before the probe end the walk.
            if self.trail_record > index {
                break;
            }
            let p = self.trail[index];
            conflict = self.reason(p.atom());
            self.seen[p.atom()] = false;
            pivot = Some(p);
            path_count -= 1;
        }
        // Marks below the probe snapshot may survive the early break; they
        // cover level-0 atoms only, which analysis never consults.
    }

    /// Enqueue within the probe: the reason is set, the level is not.
    fn probe_enqueue(&mut self, literal: Literal, from: CRef) {
        debug_assert!(self.value_literal(literal).is_none());
        self.assigns[literal.atom()] = Some(literal.polarity());
        self.vardata[literal.atom()].reason = from;
        self.trail.push(literal);
    }

    /// Unwind the trail back to the probe snapshot.
    fn unwind_probe(&mut self) {
        for position in (self.trail_record..self.trail.len()).rev() {
            let atom = self.trail[position].atom();
            self.assigns[atom] = None;
        }
        self.qhead = self.trail_record;
        self.trail.truncate(self.trail_record);
    }

    /// Propagation for probes: no ticks, no stats, no purgatory, no trail
    /// saving.
    fn probe_propagate(&mut self) -> Option<CRef> {
        let mut conflict = None;

        self.watches.clean_all(&self.ca);
        self.watches_bin.clean_all(&self.ca);

        'queue: while self.qhead < self.trail.len() {
            let p = self.trail[self.qhead];
            self.qhead += 1;

            let mut at = 0;
            while at < self.watches_bin.occs(p).len() {
                let watcher = self.watches_bin.occs(p)[at];
                at += 1;
                match self.value_literal(watcher.blocker) {
                    Some(false) => return Some(watcher.clause),
                    None => self.probe_enqueue(watcher.blocker, watcher.clause),
                    Some(true) => {}
                }
            }

            let mut watchers = self.watches.take(p);
            let mut read = 0;
            let mut write = 0;
            'watchers: while read < watchers.len() {
                let blocker = watchers[read].blocker;
                if self.value_literal(blocker) == Some(true) {
                    watchers[write] = watchers[read];
                    write += 1;
                    read += 1;
                    continue 'watchers;
                }

                let cref = watchers[read].clause;
                let false_literal = !p;
                {
                    let lits = self.ca.lits_mut(cref);
                    if lits[0] == false_literal {
                        lits.swap(0, 1);
                    }
                }

                let first = self.ca.lits(cref)[0];
                if first != blocker && self.value_literal(first) == Some(true) {
                    watchers[read].blocker = first;
                    watchers[write] = watchers[read];
                    write += 1;
                    read += 1;
                    continue 'watchers;
                }

                let size = self.ca.size(cref);
                for k in 2..size {
                    let candidate = self.ca.lits(cref)[k];
                    if self.value_literal(candidate) != Some(false) {
                        let moved = Watcher::new(cref, first);
                        read += 1;
                        let lits = self.ca.lits_mut(cref);
                        lits[1] = candidate;
                        lits[k] = false_literal;
                        self.watches.occs_mut(!candidate).push(moved);
                        continue 'watchers;
                    }
                }

                watchers[read].blocker = first;
                watchers[write] = watchers[read];
                write += 1;
                read += 1;
                if self.value_literal(first) == Some(false) {
                    conflict = Some(cref);
                    self.qhead = self.trail.len();
                    while read < watchers.len() {
                        watchers[write] = watchers[read];
                        write += 1;
                        read += 1;
                    }
                } else {
                    self.probe_enqueue(first, cref);
                }
            }
            watchers.truncate(write);
            self.watches.put_back(p, watchers);

            if conflict.is_some() {
                break 'queue;
            }
        }

        conflict
    }
}
