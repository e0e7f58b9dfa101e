/*!
Watched-literal unit propagation.

Propagation is breadth-first over the trail: `qhead` indexes the next
assigned literal to propagate, and enqueueing is just pushing to the trail.
For each literal `p` leaving the queue the watch lists of `¬p` are visited:

- **Binary watchers** first: the other literal is either a conflict
  (false), a consequence (unassigned), or already true.
- **Long watchers** next, with the two-watch scheme: the clause keeps
  positions 0 and 1 as its watched literals. If the blocker hint is true
  the clause is skipped without being read. Otherwise the false literal is
  normalised to position 1 and positions ≥ 2 are scanned for a non-false
  replacement; failing that the clause is unit (enqueue position 0) or a
  conflict (flush the queue and return it).
- **Unary watchers** (the purgatory of imported clauses) last: a clause is
  watched on a single literal, and only a conflict is detectable. On
  conflict the clause has proven itself: it is promoted to the two-watch
  scheme with a highest-level literal in position 1, so it propagates
  correctly after the coming backtrack.

A tick is counted for each long clause inspected to its end; ticks drive
the focus/stable regime switch.

The postcondition on a conflict-free return: every clause with all but one
literal false has its remaining literal true.
*/

use crate::db::arena::CRef;
use crate::db::watches::Watcher;
use crate::misc::log::targets;
use crate::solver::Solver;
use crate::structures::literal::Literal;

impl Solver {
    /// Propagate all enqueued facts. Returns the conflicting clause, if a
    /// conflict arises.
    pub(crate) fn propagate(&mut self) -> Option<CRef> {
        let mut conflict = None;
        let mut propagated = 0u64;

        self.watches.clean_all(&self.ca);
        self.watches_bin.clean_all(&self.ca);
        if self.use_unary_watched {
            self.unary_watches.clean_all(&self.ca);
        }

        while self.qhead < self.trail.len() {
            let p = self.trail[self.qhead];
            self.qhead += 1;
            propagated += 1;

            if let Some(saved_conflict) = self.replay_saved_trail(p) {
                self.counters.propagations += propagated;
                self.simp_db_props -= propagated as i64;
                return Some(saved_conflict);
            }

            // Binary clauses.
            let mut at = 0;
            while at < self.watches_bin.occs(p).len() {
                let watcher = self.watches_bin.occs(p)[at];
                at += 1;
                match self.value_literal(watcher.blocker) {
                    Some(false) => {
                        log::trace!(
                            target: targets::PROPAGATION,
                            "Binary conflict on {p} in {:?}",
                            watcher.clause
                        );
                        self.counters.propagations += propagated;
                        self.simp_db_props -= propagated as i64;
                        return Some(watcher.clause);
                    }
                    None => self.unchecked_enqueue(watcher.blocker, watcher.clause),
                    Some(true) => {}
                }
            }

            // Long clauses.
            let mut watchers = self.watches.take(p);
            let mut read = 0;
            let mut write = 0;
            'watchers: while read < watchers.len() {
                // Try to avoid inspecting the clause.
                let blocker = watchers[read].blocker;
                if self.value_literal(blocker) == Some(true) {
                    watchers[write] = watchers[read];
                    write += 1;
                    read += 1;
                    continue 'watchers;
                }

                // Normalise: the false literal sits at position 1.
                let cref = watchers[read].clause;
                let false_literal = !p;
                {
                    let lits = self.ca.lits_mut(cref);
                    if lits[0] == false_literal {
                        lits.swap(0, 1);
                    }
                    debug_assert!(lits[1] == false_literal);
                }
                read += 1;

                let first = self.ca.lits(cref)[0];
                let watcher = Watcher::new(cref, first);
                if first != blocker && self.value_literal(first) == Some(true) {
                    watchers[write] = watcher;
                    write += 1;
                    continue 'watchers;
                }

                // Look for a new literal to watch.
                let size = self.ca.size(cref);
                for k in 2..size {
                    let candidate = self.ca.lits(cref)[k];
                    if self.value_literal(candidate) != Some(false) {
                        let lits = self.ca.lits_mut(cref);
                        lits[1] = candidate;
                        lits[k] = false_literal;
                        self.watches.occs_mut(!candidate).push(watcher);
                        continue 'watchers;
                    }
                }
                self.ticks += 1;

                // No watch found: the clause is unit or a conflict.
                watchers[write] = watcher;
                write += 1;
                if self.value_literal(first) == Some(false) {
                    conflict = Some(cref);
                    self.qhead = self.trail.len();
                    while read < watchers.len() {
                        watchers[write] = watchers[read];
                        write += 1;
                        read += 1;
                    }
                } else {
                    self.unchecked_enqueue(first, cref);
                }
            }
            watchers.truncate(write);
            self.watches.put_back(p, watchers);

            if self.use_unary_watched && conflict.is_none() {
                conflict = self.propagate_unary_watches(p);
            }
        }

        self.counters.propagations += propagated;
        self.simp_db_props -= propagated as i64;
        conflict
    }

    /// Propagate the single-watch purgatory of `p`. Only conflicts can be
    /// discovered; a conflicting clause is promoted out of the purgatory.
    fn propagate_unary_watches(&mut self, p: Literal) -> Option<CRef> {
        let mut conflict = None;
        let false_literal = !p;

        let mut watchers = self.unary_watches.take(p);
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
            debug_assert!(self.ca.one_watched(cref));
            debug_assert!(self.ca.lits(cref)[0] == false_literal);
            read += 1;

            let size = self.ca.size(cref);
            for k in 1..size {
                let candidate = self.ca.lits(cref)[k];
                if self.value_literal(candidate) != Some(false) {
                    let lits = self.ca.lits_mut(cref);
                    lits[0] = candidate;
                    lits[k] = false_literal;
                    let moved = Watcher::new(cref, false_literal);
                    self.unary_watches.occs_mut(!candidate).push(moved);
                    continue 'watchers;
                }
            }

            // Every literal is false: the import proved itself useful.
            conflict = Some(cref);
            self.qhead = self.trail.len();
            self.exchange_stats.good_imported += 1;
            log::debug!(
                target: targets::PROPAGATION,
                "Purgatory conflict, promoting {cref:?}"
            );

            // Promote: a highest-level literal moves to position 1 so the
            // clause propagates correctly once the conflict is resolved.
            // The current watcher is dropped rather than copied back.
            let mut deepest = 1;
            let mut max_level = self.level(self.ca.lits(cref)[1].atom());
            for k in 2..size {
                let level = self.level(self.ca.lits(cref)[k].atom());
                if level > max_level {
                    max_level = level;
                    deepest = k;
                }
            }
            self.ca.lits_mut(cref).swap(1, deepest);
            self.attach_clause(cref);
            self.ca.set_one_watched(cref, false);
            self.ca.set_exported(cref, 2);

            while read < watchers.len() {
                watchers[write] = watchers[read];
                write += 1;
                read += 1;
            }
        }
        watchers.truncate(write);
        self.unary_watches.put_back(p, watchers);

        conflict
    }
}
