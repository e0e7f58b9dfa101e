/*!
The learnt-clause database manager.

Two managers share one flat state structure, selected by [ManagerMode]:

- **Tiers** partitions learnt clauses by LBD into `core` (kept, activity
  bumped), `tier2` (demoted to local when untouched for 30,000 conflicts)
  and `local` (halved by a composite LBD/activity order at each reduction).
  Tier2 reductions run every 10,000 conflicts and local reductions every
  15,000.
- **Glucose** keeps a single list (the core tier) and halves it on a
  conflict schedule that stretches whenever the database looks too good to
  compare.

Clauses whose LBD improves are promoted across tiers by
[update_clause](crate::solver::Solver::manager_update_clause), and a clause
whose LBD improved recently is protected from one reduction through the
`can_be_del` bit.

The purgatory of imported one-watched clauses has its own trim, keyed on
the size of the core tier.
*/

use std::cmp::Ordering;

use crate::db::arena::{CRef, ClauseAllocator, Tier};
use crate::misc::log::targets;
use crate::solver::Solver;

/// Which reduction policy is active.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ManagerMode {
    Glucose,
    Tiers,
}

/// Counters and thresholds for both managers.
pub struct ManagerState {
    pub mode: ManagerMode,
    pub reduce_count: u64,
    pub removed_count: u64,
    factor_for_purgatory: usize,

    // Glucose.
    special_inc_reduce: u64,
    clauses_before_reduce: u64,
    cur_restart: u64,
    lbd_frozen: u32,
    lcm_pending: bool,

    // Tiers.
    next_tiers_reduce: u64,
    next_local_reduce: u64,
    pub core_ub: u32,
    tiers_ub: u32,
    cur_simplify: u64,
    conflicts_before_simplify: u64,
}

impl ManagerState {
    pub fn new(mode: ManagerMode) -> Self {
        ManagerState {
            mode,
            reduce_count: 0,
            removed_count: 0,
            factor_for_purgatory: match mode {
                ManagerMode::Glucose => 2,
                ManagerMode::Tiers => 4,
            },

            special_inc_reduce: 1000,
            clauses_before_reduce: 2000,
            cur_restart: 1,
            lbd_frozen: 30,
            lcm_pending: true,

            next_tiers_reduce: 10_000,
            next_local_reduce: 15_000,
            core_ub: 3,
            tiers_ub: 6,
            cur_simplify: 1,
            conflicts_before_simplify: 1000,
        }
    }
}

/// Deletion order for a reduction: clauses to evict sort first.
///
/// Binary clauses are always kept, so sort last. Among the rest a larger
/// LBD is worse, and ties go to the clause with lower activity.
pub(crate) fn reduce_order(ca: &ClauseAllocator, x: CRef, y: CRef) -> Ordering {
    match (ca.size(x) == 2, ca.size(y) == 2) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => Ordering::Equal,
        (false, false) => ca
            .lbd(y)
            .cmp(&ca.lbd(x))
            .then(ca.activity(x).partial_cmp(&ca.activity(y)).unwrap_or(Ordering::Equal)),
    }
}

/// Deletion order for the purgatory: as [reduce_order], with size dominant.
fn purgatory_order(ca: &ClauseAllocator, x: CRef, y: CRef) -> Ordering {
    match (ca.size(x) == 2, ca.size(y) == 2) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => Ordering::Equal,
        (false, false) => ca
            .size(y)
            .cmp(&ca.size(x))
            .then(ca.lbd(y).cmp(&ca.lbd(x)))
            .then(ca.activity(x).partial_cmp(&ca.activity(y)).unwrap_or(Ordering::Equal)),
    }
}

impl Solver {
    /// Reset the reduction schedule against the current conflict count.
    pub(crate) fn manager_init(&mut self) {
        if self.manager.mode == ManagerMode::Tiers {
            self.manager.next_local_reduce = self.counters.conflicts + 15_000;
        }
    }

    /// Place a fresh learnt clause into a tier.
    pub(crate) fn manager_add(&mut self, cref: CRef) {
        match self.manager.mode {
            ManagerMode::Glucose => {
                self.learnts_core.push(cref);
                self.ca.set_location(cref, Tier::Core);
            }

            ManagerMode::Tiers => {
                let lbd = self.ca.lbd(cref);
                if lbd <= self.manager.core_ub {
                    self.learnts_core.push(cref);
                    self.ca.set_location(cref, Tier::Core);
                } else if lbd <= self.manager.tiers_ub {
                    self.learnts_tier2.push(cref);
                    self.ca.set_location(cref, Tier::Tier2);
                    self.ca.set_touched(cref, self.counters.conflicts);
                } else {
                    self.learnts_local.push(cref);
                    self.ca.set_location(cref, Tier::Local);
                }

                // A tiny core after many conflicts means the bound is too
                // strict for this instance.
                if self.counters.conflicts == 100_000 && self.learnts_core.len() < 100 {
                    self.manager.core_ub = 5;
                }
            }
        }
    }

    /// Revisit a clause that took part in conflict analysis (or was
    /// vivified, with `during_analysis` false).
    pub(crate) fn manager_update_clause(&mut self, cref: CRef, during_analysis: bool) -> bool {
        match self.manager.mode {
            ManagerMode::Glucose => {
                self.cla_bump_activity(cref);
                if self.ca.lbd(cref) > 2 {
                    let lbd = self.lbd_of_clause(cref);
                    if lbd + 1 < self.ca.lbd(cref) {
                        if self.ca.lbd(cref) <= self.manager.lbd_frozen && during_analysis {
                            self.ca.set_can_be_del(cref, false);
                        }
                        self.ca.set_lbd(cref, lbd);
                        return true;
                    }
                }
                false
            }

            ManagerMode::Tiers => {
                if self.ca.learnt(cref) && self.ca.location(cref) != Tier::Core {
                    let lbd = self.lbd_of_clause(cref);
                    if lbd < self.ca.lbd(cref) {
                        if self.ca.lbd(cref) <= 30 && during_analysis {
                            // Protect once from reduction.
                            self.ca.set_can_be_del(cref, false);
                        }
                        self.ca.set_lbd(cref, lbd);
                        if lbd <= self.manager.core_ub {
                            self.learnts_core.push(cref);
                            self.ca.set_location(cref, Tier::Core);
                        } else if lbd <= self.manager.tiers_ub
                            && self.ca.location(cref) == Tier::Local
                        {
                            self.learnts_tier2.push(cref);
                            self.ca.set_location(cref, Tier::Tier2);
                        }
                    }

                    if during_analysis {
                        match self.ca.location(cref) {
                            Tier::Tier2 => self.ca.set_touched(cref, self.counters.conflicts),
                            Tier::Local => self.cla_bump_activity(cref),
                            Tier::Core => {}
                        }
                    }
                }
                false
            }
        }
    }

    /// Whether a reduction is due.
    pub(crate) fn manager_trigger_reduce(&mut self) -> bool {
        match self.manager.mode {
            ManagerMode::Glucose => {
                if self.counters.conflicts
                    >= self.manager.cur_restart * self.manager.clauses_before_reduce
                    && !self.learnts_core.is_empty()
                {
                    self.manager.cur_restart =
                        self.counters.conflicts / self.manager.clauses_before_reduce + 1;
                    return true;
                }
                false
            }

            ManagerMode::Tiers => {
                self.counters.conflicts >= self.manager.next_tiers_reduce
                    || self.counters.conflicts >= self.manager.next_local_reduce
            }
        }
    }

    /// Whether a vivification pass should run now.
    pub(crate) fn manager_perform_lcm(&mut self) -> bool {
        match self.manager.mode {
            ManagerMode::Glucose => {
                if self.manager.lcm_pending {
                    self.manager.lcm_pending = false;
                    return true;
                }
                false
            }

            ManagerMode::Tiers => {
                if self.counters.conflicts
                    >= self.manager.cur_simplify * self.manager.conflicts_before_simplify
                {
                    self.manager.cur_simplify =
                        self.counters.conflicts / self.manager.conflicts_before_simplify + 1;
                    self.manager.conflicts_before_simplify += 1000;
                    return true;
                }
                false
            }
        }
    }

    /// Evict learnt clauses according to the active policy.
    pub(crate) fn manager_reduce(&mut self) {
        log::debug!(
            target: targets::REDUCTION,
            "Reduce at {} conflicts ({}/{}/{} learnts)",
            self.counters.conflicts,
            self.learnts_core.len(),
            self.learnts_tier2.len(),
            self.learnts_local.len()
        );
        self.manager.reduce_count += 1;
        self.trail_saving.reset();

        match self.manager.mode {
            ManagerMode::Glucose => self.reduce_glucose(),

            ManagerMode::Tiers => {
                if self.counters.conflicts >= self.manager.next_tiers_reduce {
                    self.manager.next_tiers_reduce = self.counters.conflicts + 10_000;
                    self.reduce_tier2();
                }
                if self.counters.conflicts >= self.manager.next_local_reduce {
                    self.manager.next_local_reduce = self.counters.conflicts + 15_000;
                    self.reduce_local();
                }
            }
        }

        if !self.unary_watched_clauses.is_empty() {
            self.reduce_purgatory();
        }

        self.check_garbage();
    }

    /// Demote tier2 clauses untouched for 30,000 conflicts.
    fn reduce_tier2(&mut self) {
        let mut kept = 0;
        for i in 0..self.learnts_tier2.len() {
            let cref = self.learnts_tier2[i];
            // Promoted clauses just drop out of the tier2 list.
            if self.ca.location(cref) != Tier::Tier2 {
                continue;
            }
            if !self.locked(cref) && self.ca.touched(cref) + 30_000 < self.counters.conflicts {
                self.learnts_local.push(cref);
                self.ca.set_location(cref, Tier::Local);
                self.ca.set_activity(cref, 0.0);
                self.cla_bump_activity(cref);
            } else {
                self.learnts_tier2[kept] = cref;
                kept += 1;
            }
        }
        self.learnts_tier2.truncate(kept);
    }

    /// Evict the worse half of the local tier.
    fn reduce_local(&mut self) {
        let ca = &self.ca;
        self.learnts_local.sort_by(|&x, &y| reduce_order(ca, x, y));

        let mut limit = (self.learnts_local.len() / 2) as isize;
        let mut kept = 0;
        for i in 0..self.learnts_local.len() {
            let cref = self.learnts_local[i];
            if self.ca.location(cref) != Tier::Local {
                continue;
            }
            if self.ca.can_be_del(cref) && !self.locked(cref) && (i as isize) < limit {
                self.remove_clause(cref, false);
                self.manager.removed_count += 1;
            } else {
                if !self.ca.can_be_del(cref) {
                    // The clause is kept regardless, so another may go.
                    limit += 1;
                }
                self.ca.set_can_be_del(cref, true);
                self.learnts_local[kept] = cref;
                kept += 1;
            }
        }
        self.learnts_local.truncate(kept);
    }

    /// Halve the single glucose-style list, stretching the schedule when
    /// the database is uniformly good.
    fn reduce_glucose(&mut self) {
        self.manager.lcm_pending = true;

        let ca = &self.ca;
        self.learnts_core.sort_by(|&x, &y| reduce_order(ca, x, y));

        let middle = self.learnts_core[self.learnts_core.len() / 2];
        if self.ca.lbd(middle) <= 3 {
            self.manager.clauses_before_reduce += self.manager.special_inc_reduce;
        }
        if let Some(&last) = self.learnts_core.last() {
            if self.ca.lbd(last) <= 5 {
                self.manager.clauses_before_reduce += self.manager.special_inc_reduce;
            }
        }

        let mut limit = (self.learnts_core.len() / 2) as isize;
        let mut kept = 0;
        for i in 0..self.learnts_core.len() {
            let cref = self.learnts_core[i];
            if self.ca.lbd(cref) > 2
                && self.ca.size(cref) > 2
                && self.ca.can_be_del(cref)
                && !self.locked(cref)
                && (i as isize) < limit
            {
                self.remove_clause(cref, false);
                self.manager.removed_count += 1;
            } else {
                if !self.ca.can_be_del(cref) {
                    limit += 1;
                }
                self.ca.set_can_be_del(cref, true);
                self.learnts_core[kept] = cref;
                kept += 1;
            }
        }
        self.learnts_core.truncate(kept);
    }

    /// Trim imported one-watched clauses that never proved useful.
    fn reduce_purgatory(&mut self) {
        let allowance = self.learnts_core.len() * self.manager.factor_for_purgatory;
        let mut limit = self.unary_watched_clauses.len() as isize - allowance as isize;
        if self.unary_watched_clauses.len() <= 100 || limit <= 0 {
            return;
        }

        let ca = &self.ca;
        self.unary_watched_clauses
            .sort_by(|&x, &y| purgatory_order(ca, x, y));

        let mut kept = 0;
        for i in 0..self.unary_watched_clauses.len() {
            let cref = self.unary_watched_clauses[i];
            if self.ca.lbd(cref) > 2
                && self.ca.size(cref) > 2
                && self.ca.can_be_del(cref)
                && !self.locked(cref)
                && (i as isize) < limit
            {
                self.remove_clause(cref, self.ca.one_watched(cref));
                self.exchange_stats.removed_in_purgatory += 1;
            } else {
                if !self.ca.can_be_del(cref) {
                    limit += 1;
                }
                self.ca.set_can_be_del(cref, true);
                self.unary_watched_clauses[kept] = cref;
                kept += 1;
            }
        }
        self.unary_watched_clauses.truncate(kept);
    }
}
