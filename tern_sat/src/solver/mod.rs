/*!
The solver: state, construction, and the small operations everything else
leans on.

The struct gathers every database of a solve: the clause arena, watch
lists, trail, activity heap, and the controller state for restarts,
rephasing, reduction, trail saving and clause exchange. The algorithm is
factored into the [procedures](crate::procedures), each an `impl Solver`
block in its own file.

A solver owns its state exclusively; the only shared handle is the
[interrupt flag](Solver::interrupt_handle), an atomic polled at well-defined
checkpoints of the search.
*/

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{Config, ReduceMode, RestartMode, SearchMode};
use crate::db::arena::{CRef, ClauseAllocator};
use crate::db::manager::ManagerState;
use crate::db::manager::ManagerMode;
use crate::db::watches::{OccLists, Watcher};
use crate::exchange::{Exchange, ExchangeStats};
use crate::generic::index_heap::IndexHeap;
use crate::generic::xorshift::Xorshift128;
use crate::misc::log::targets;
use crate::phase::PhaseState;
use crate::reports::drat::ProofWriter;
use crate::restart::{ActiveRestart, RestartCtl};
use crate::structures::atom::Atom;
use crate::structures::literal::Literal;
use crate::trail_saving::TrailSaving;

/// The reason and level of an assigned atom.
#[derive(Clone, Copy)]
pub(crate) struct VarData {
    pub reason: CRef,
    pub level: u32,
}

impl VarData {
    pub fn new(reason: CRef, level: u32) -> Self {
        VarData { reason, level }
    }
}

/// The search regime the solver is currently in.
///
/// `Stable` and `Focus` alternate during a target-mode solve; the `Only`
/// variants never switch.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Regime {
    Stable,
    Focus,
    OnlyStable,
    OnlyFocus,
}

impl Regime {
    pub fn stable(self) -> bool {
        matches!(self, Regime::Stable | Regime::OnlyStable)
    }

    pub fn focus(self) -> bool {
        matches!(self, Regime::Focus | Regime::OnlyFocus)
    }
}

/// Counts of the primitive operations of a solve.
#[derive(Default)]
pub struct Counters {
    pub solves: u64,
    pub starts: u64,
    pub decisions: u64,
    pub rnd_decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
}

/// Counts of the optional techniques of a solve.
#[derive(Default)]
pub struct Stats {
    pub glue_learnts: u64,
    pub binary_learnts: u64,
    pub unit_learnts: u64,
    pub lcm_tested: u64,
    pub lcm_shrunk: u64,
    pub walks: u64,
    pub flips: u64,
    pub no_decision_conflicts: u64,
    pub binary_resolutions: u64,
    pub self_subsumptions: u64,
}

/// The solver.
pub struct Solver {
    pub config: Config,

    // Formula and learnt clauses.
    pub(crate) ok: bool,
    pub(crate) ca: ClauseAllocator,
    pub(crate) clauses: Vec<CRef>,
    pub(crate) learnts_core: Vec<CRef>,
    pub(crate) learnts_tier2: Vec<CRef>,
    pub(crate) learnts_local: Vec<CRef>,
    pub(crate) unary_watched_clauses: Vec<CRef>,

    // Watches.
    pub(crate) watches: OccLists,
    pub(crate) watches_bin: OccLists,
    pub(crate) unary_watches: OccLists,
    pub(crate) use_unary_watched: bool,

    // Assignment state.
    pub(crate) assigns: Vec<Option<bool>>,
    pub(crate) vardata: Vec<VarData>,
    pub(crate) saved_phase: Vec<bool>,
    pub(crate) target_phase: Vec<Option<bool>>,
    pub(crate) decision: Vec<bool>,
    pub(crate) trail: Vec<Literal>,
    pub(crate) trail_lim: Vec<usize>,
    pub(crate) qhead: usize,
    pub(crate) assumptions: Vec<Literal>,

    // Heuristics.
    pub(crate) order_heap: IndexHeap<f64>,
    pub(crate) var_inc: f64,
    pub(crate) cla_inc: f64,
    pub(crate) var_decay: f64,
    pub(crate) rng: Xorshift128,

    // Analysis scratch.
    pub(crate) seen: Vec<bool>,
    pub(crate) analyze_stack: Vec<Literal>,
    pub(crate) analyze_toclear: Vec<Literal>,
    pub(crate) last_decision_level: Vec<Literal>,
    pub(crate) stamp: Vec<u32>,
    pub(crate) stamp_flag: u32,

    // Vivification scratch.
    pub(crate) trail_record: usize,
    pub(crate) vivify_learnt: Vec<Literal>,

    // Controllers.
    pub(crate) restart: RestartCtl,
    pub(crate) manager: ManagerState,
    pub(crate) phase: Option<PhaseState>,
    pub(crate) regime: Regime,
    pub(crate) trail_saving: TrailSaving,

    // Mode switching.
    pub(crate) ticks: u64,
    pub(crate) next_regime_change: u64,
    pub(crate) regime_changes: u64,
    pub(crate) phases_used: String,

    // Level-0 simplification bookkeeping.
    pub(crate) simp_db_assigns: Option<usize>,
    pub(crate) simp_db_props: i64,
    pub(crate) remove_satisfied: bool,

    // Local-search results.
    pub(crate) solved_by_walk: bool,
    pub(crate) walk_solution: Vec<bool>,

    // Proof and exchange.
    pub(crate) proof: Option<ProofWriter>,
    pub(crate) exchange: Option<Exchange>,
    pub(crate) exchange_stats: ExchangeStats,

    // Budgets.
    pub(crate) conflict_budget: Option<u64>,
    pub(crate) propagation_budget: Option<u64>,
    interrupt: Arc<AtomicBool>,

    pub(crate) adapt_strategies: bool,

    // Results.
    pub model: Vec<Option<bool>>,
    pub conflict: Vec<Literal>,

    pub counters: Counters,
    pub stats: Stats,
}

impl Default for Solver {
    fn default() -> Self {
        Solver::new(Config::default())
    }
}

impl Solver {
    pub fn new(config: Config) -> Self {
        let (regime, phase, phases_used) = match config.search_mode {
            SearchMode::Focus => (Regime::OnlyFocus, None, String::from("Focus")),
            SearchMode::Target => (
                Regime::Focus,
                Some(PhaseState::default()),
                String::from("Focus"),
            ),
            SearchMode::Stable => (
                Regime::OnlyStable,
                Some(PhaseState::default()),
                String::from("Stable("),
            ),
        };

        // Alternating regimes fix their own controller; a focus-only solve
        // starts from the configured one.
        let active_restart = match regime {
            Regime::OnlyStable => ActiveRestart::Luby,
            Regime::OnlyFocus => match config.restart_mode {
                RestartMode::Glucose => ActiveRestart::Glucose,
                RestartMode::Luby => ActiveRestart::Luby,
            },
            _ => ActiveRestart::Glucose,
        };

        let manager = ManagerState::new(match config.reduce_mode {
            ReduceMode::Glucose => ManagerMode::Glucose,
            ReduceMode::Tiers => ManagerMode::Tiers,
        });

        let restart = RestartCtl::new(active_restart);

        Solver {
            var_decay: config.var_decay,
            rng: Xorshift128::from_u32_seed(config.random_seed),
            trail_saving: TrailSaving::new(config.save_trail),
            adapt_strategies: config.adapt_strategies,
            config,

            ok: true,
            ca: ClauseAllocator::default(),
            clauses: Vec::new(),
            learnts_core: Vec::new(),
            learnts_tier2: Vec::new(),
            learnts_local: Vec::new(),
            unary_watched_clauses: Vec::new(),

            watches: OccLists::default(),
            watches_bin: OccLists::default(),
            unary_watches: OccLists::default(),
            use_unary_watched: false,

            assigns: Vec::new(),
            vardata: Vec::new(),
            saved_phase: Vec::new(),
            target_phase: Vec::new(),
            decision: Vec::new(),
            trail: Vec::new(),
            trail_lim: Vec::new(),
            qhead: 0,
            assumptions: Vec::new(),

            order_heap: IndexHeap::default(),
            var_inc: 1.0,
            cla_inc: 1.0,

            seen: Vec::new(),
            analyze_stack: Vec::new(),
            analyze_toclear: Vec::new(),
            last_decision_level: Vec::new(),
            stamp: vec![0],
            stamp_flag: 0,

            trail_record: 0,
            vivify_learnt: Vec::new(),

            restart,
            manager,
            phase,
            regime,

            ticks: 0,
            next_regime_change: 1023,
            regime_changes: 1,
            phases_used,

            simp_db_assigns: None,
            simp_db_props: 0,
            remove_satisfied: true,

            solved_by_walk: false,
            walk_solution: Vec::new(),

            proof: None,
            exchange: None,
            exchange_stats: ExchangeStats::default(),

            conflict_budget: None,
            propagation_budget: None,
            interrupt: Arc::new(AtomicBool::new(false)),

            model: Vec::new(),
            conflict: Vec::new(),

            counters: Counters::default(),
            stats: Stats::default(),
        }
    }

    // State inspection.

    /// False once the formula is known contradictory; no further use of the
    /// solver will change that.
    pub fn okay(&self) -> bool {
        self.ok
    }

    /// The current number of atoms.
    pub fn atom_count(&self) -> usize {
        self.vardata.len()
    }

    /// The current number of problem clauses.
    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    /// The current number of learnt clauses, across tiers.
    pub fn learnt_count(&self) -> usize {
        self.learnts_core.len() + self.learnts_tier2.len() + self.learnts_local.len()
    }

    /// The current value of an atom.
    pub fn value(&self, atom: Atom) -> Option<bool> {
        self.assigns[atom]
    }

    /// The current value of a literal.
    pub fn value_literal(&self, literal: Literal) -> Option<bool> {
        self.assigns[literal.atom()].map(|v| v == literal.polarity())
    }

    /// The value of an atom in the last model, if the last solve was
    /// satisfiable.
    pub fn model_value(&self, atom: Atom) -> Option<bool> {
        self.model[atom]
    }

    pub(crate) fn level(&self, atom: Atom) -> usize {
        self.vardata[atom].level as usize
    }

    pub(crate) fn reason(&self, atom: Atom) -> CRef {
        self.vardata[atom].reason
    }

    pub(crate) fn decision_level(&self) -> usize {
        self.trail_lim.len()
    }

    /// A bit per decision level, folded at 32, to approximate level sets.
    pub(crate) fn abstract_level(&self, atom: Atom) -> u32 {
        1 << (self.level(atom) & 31)
    }

    // Assignment.

    pub(crate) fn new_decision_level(&mut self) {
        self.trail_lim.push(self.trail.len());
    }

    /// Enqueue a literal whose atom is unassigned.
    pub(crate) fn unchecked_enqueue(&mut self, literal: Literal, from: CRef) {
        debug_assert!(self.value_literal(literal).is_none());
        self.assigns[literal.atom()] = Some(literal.polarity());
        self.vardata[literal.atom()] = VarData::new(from, self.decision_level() as u32);
        self.trail.push(literal);
    }

    // Clause attachment.

    pub(crate) fn attach_clause(&mut self, cref: CRef) {
        let lits = self.ca.lits(cref);
        debug_assert!(lits.len() > 1);
        let (first, second) = (lits[0], lits[1]);
        let watches = if lits.len() == 2 {
            &mut self.watches_bin
        } else {
            &mut self.watches
        };
        watches.occs_mut(!first).push(Watcher::new(cref, second));
        watches.occs_mut(!second).push(Watcher::new(cref, first));
    }

    pub(crate) fn detach_clause(&mut self, cref: CRef, strict: bool) {
        let lits = self.ca.lits(cref);
        debug_assert!(lits.len() > 1);
        let (first, second) = (lits[0], lits[1]);
        let watches = if lits.len() == 2 {
            &mut self.watches_bin
        } else {
            &mut self.watches
        };
        if strict {
            watches.remove(!first, cref);
            watches.remove(!second, cref);
        } else {
            watches.smudge(!first);
            watches.smudge(!second);
        }
    }

    /// Attach an imported clause on a single watch.
    pub(crate) fn attach_clause_purgatory(&mut self, cref: CRef) {
        let lits = self.ca.lits(cref);
        debug_assert!(lits.len() > 1);
        let (first, second) = (lits[0], lits[1]);
        self.unary_watches
            .occs_mut(!first)
            .push(Watcher::new(cref, second));
    }

    pub(crate) fn detach_clause_purgatory(&mut self, cref: CRef, strict: bool) {
        let first = self.ca.lits(cref)[0];
        if strict {
            self.unary_watches.remove(!first, cref);
        } else {
            self.unary_watches.smudge(!first);
        }
    }

    /// Detach and free a clause, recording the deletion in the proof.
    pub(crate) fn remove_clause(&mut self, cref: CRef, in_purgatory: bool) {
        if !self.ca.removed(cref) {
            self.proof_delete(cref);
        }

        if in_purgatory {
            self.detach_clause_purgatory(cref, false);
        } else {
            self.detach_clause(cref, false);
        }

        // Don't leave a reason pointing at freed memory.
        if self.locked(cref) {
            let asserted = self.ca.lits(cref)[0].atom();
            self.vardata[asserted].reason = CRef::UNDEF;
        }
        self.ca.free(cref);
    }

    /// Whether the clause is the reason for an implication on the trail.
    pub(crate) fn locked(&self, cref: CRef) -> bool {
        let lits = self.ca.lits(cref);
        let held_by = |literal: Literal| {
            self.value_literal(literal) == Some(true) && self.reason(literal.atom()) == cref
        };
        if lits.len() > 2 {
            held_by(lits[0])
        } else {
            held_by(lits[0]) || held_by(lits[1])
        }
    }

    pub(crate) fn satisfied(&self, cref: CRef) -> bool {
        self.ca
            .lits(cref)
            .iter()
            .any(|&l| self.value_literal(l) == Some(true))
    }

    // LBD.

    /// The number of distinct decision levels among `literals`.
    pub(crate) fn lbd_of(&mut self, literals: &[Literal]) -> u32 {
        self.stamp_flag += 1;
        let mut levels = 0;
        for literal in literals {
            let level = self.vardata[literal.atom()].level as usize;
            if self.stamp[level] != self.stamp_flag {
                self.stamp[level] = self.stamp_flag;
                levels += 1;
            }
        }
        levels
    }

    pub(crate) fn lbd_of_clause(&mut self, cref: CRef) -> u32 {
        self.stamp_flag += 1;
        let mut levels = 0;
        for i in 0..self.ca.size(cref) {
            let literal = self.ca.lits(cref)[i];
            let level = self.vardata[literal.atom()].level as usize;
            if self.stamp[level] != self.stamp_flag {
                self.stamp[level] = self.stamp_flag;
                levels += 1;
            }
        }
        levels
    }

    // Activity.

    pub(crate) fn insert_var_order(&mut self, atom: Atom) {
        if self.decision[atom] {
            self.order_heap.insert(atom);
        }
    }

    pub(crate) fn var_decay_activity(&mut self) {
        self.var_inc *= 1.0 / self.var_decay;
    }

    pub(crate) fn var_bump_activity(&mut self, atom: Atom) {
        let bumped = self.order_heap.value_of(atom) + self.var_inc;
        self.order_heap.revalue(atom, bumped);
        if bumped > 1e100 {
            // Rescale every activity in lockstep with the increment.
            self.order_heap.apply_to_all(|a| a * 1e-100);
            self.var_inc *= 1e-100;
        }
        self.order_heap.promote(atom);
    }

    pub(crate) fn cla_decay_activity(&mut self) {
        self.cla_inc *= 1.0 / self.config.clause_decay;
    }

    pub(crate) fn cla_bump_activity(&mut self, cref: CRef) {
        let bumped = self.ca.activity(cref) + self.cla_inc as f32;
        self.ca.set_activity(cref, bumped);
        if bumped > 1e20 {
            for i in 0..self.learnts_core.len() {
                let cr = self.learnts_core[i];
                self.ca.set_activity(cr, self.ca.activity(cr) * 1e-20);
            }
            for i in 0..self.learnts_tier2.len() {
                let cr = self.learnts_tier2[i];
                self.ca.set_activity(cr, self.ca.activity(cr) * 1e-20);
            }
            for i in 0..self.learnts_local.len() {
                let cr = self.learnts_local[i];
                self.ca.set_activity(cr, self.ca.activity(cr) * 1e-20);
            }
            self.cla_inc *= 1e-20;
        }
    }

    // Atom modes.

    /// Declare whether an atom is eligible for decisions.
    pub fn set_decision_atom(&mut self, atom: Atom, eligible: bool) {
        self.decision[atom] = eligible;
        if eligible && self.value(atom).is_none() {
            self.insert_var_order(atom);
        }
    }

    /// Declare the polarity the decision heuristic should prefer.
    pub fn set_polarity(&mut self, atom: Atom, polarity: bool) {
        self.saved_phase[atom] = polarity;
    }

    // Resource constraints.

    /// Bound the solve to `x` further conflicts.
    pub fn set_conflict_budget(&mut self, x: u64) {
        self.conflict_budget = Some(self.counters.conflicts + x);
    }

    /// Bound the solve to `x` further propagations.
    pub fn set_propagation_budget(&mut self, x: u64) {
        self.propagation_budget = Some(self.counters.propagations + x);
    }

    /// Remove conflict and propagation budgets.
    pub fn budget_off(&mut self) {
        self.conflict_budget = None;
        self.propagation_budget = None;
    }

    /// A handle to the interrupt flag, settable from another thread.
    ///
    /// Once raised, the solve returns an unknown report at the next
    /// checkpoint. The flag stays raised until cleared.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Raise the interrupt flag.
    pub fn interrupt(&self) {
        self.interrupt.store(true, Ordering::Relaxed);
    }

    /// Clear the interrupt flag.
    pub fn clear_interrupt(&self) {
        self.interrupt.store(false, Ordering::Relaxed);
    }

    pub(crate) fn within_budget(&self) -> bool {
        !self.interrupt.load(Ordering::Relaxed)
            && self
                .conflict_budget
                .map_or(true, |b| self.counters.conflicts < b)
            && self
                .propagation_budget
                .map_or(true, |b| self.counters.propagations < b)
    }

    // Proof.

    /// Stream DRAT records to `writer` from now on.
    pub fn set_proof(&mut self, writer: ProofWriter) {
        self.proof = Some(writer);
    }

    pub(crate) fn proof_add(&mut self, cref: CRef) {
        if let Some(proof) = self.proof.as_mut() {
            proof.add(self.ca.lits(cref));
        }
    }

    pub(crate) fn proof_add_lits(&mut self, literals: &[Literal]) {
        if let Some(proof) = self.proof.as_mut() {
            proof.add(literals);
        }
    }

    pub(crate) fn proof_delete(&mut self, cref: CRef) {
        if let Some(proof) = self.proof.as_mut() {
            proof.delete(self.ca.lits(cref));
        }
    }

    pub(crate) fn proof_delete_lits(&mut self, literals: &[Literal]) {
        if let Some(proof) = self.proof.as_mut() {
            proof.delete(literals);
        }
    }

    // Garbage collection.

    pub(crate) fn check_garbage(&mut self) {
        if self.ca.wasted() as f64 > self.ca.len() as f64 * self.config.garbage_frac {
            self.garbage_collect();
        }
    }

    pub(crate) fn garbage_collect(&mut self) {
        // Size the next region by the estimated utilisation, to avoid some
        // growth reallocations.
        let mut to = ClauseAllocator::with_capacity(self.ca.len() - self.ca.wasted());
        self.reloc_all(&mut to);
        log::debug!(
            target: targets::CLAUSE_DB,
            "Garbage collection: {} words => {} words",
            self.ca.len(),
            to.len()
        );
        self.ca = to;
    }

    fn reloc_all(&mut self, to: &mut ClauseAllocator) {
        self.watches.clean_all(&self.ca);
        self.watches_bin.clean_all(&self.ca);
        self.unary_watches.clean_all(&self.ca);

        // All watchers.
        for index in 0..2 * self.atom_count() {
            let literal = Literal::from_index(index);
            for watcher in self.watches.occs_mut(literal) {
                self.ca.reloc(to, &mut watcher.clause);
            }
            for watcher in self.watches_bin.occs_mut(literal) {
                self.ca.reloc(to, &mut watcher.clause);
            }
            for watcher in self.unary_watches.occs_mut(literal) {
                self.ca.reloc(to, &mut watcher.clause);
            }
        }

        // All reasons.
        for i in 0..self.trail.len() {
            let atom = self.trail[i].atom();
            let reason = self.vardata[atom].reason;
            if reason != CRef::UNDEF && (self.ca.relocated(reason) || self.locked(reason)) {
                self.ca.reloc(to, &mut self.vardata[atom].reason);
            }
        }

        // Saved reasons kept by trail saving.
        for i in 0..self.trail_saving.old_trail.len() {
            let atom = self.trail_saving.old_trail[i].atom();
            let reason = self.trail_saving.old_reasons[atom];
            if reason != CRef::UNDEF && self.ca.relocated(reason) {
                self.ca.reloc(to, &mut self.trail_saving.old_reasons[atom]);
            }
        }

        // All learnts.
        for i in 0..self.learnts_core.len() {
            self.ca.reloc(to, &mut self.learnts_core[i]);
        }
        for i in 0..self.learnts_tier2.len() {
            self.ca.reloc(to, &mut self.learnts_tier2[i]);
        }
        for i in 0..self.learnts_local.len() {
            self.ca.reloc(to, &mut self.learnts_local[i]);
        }
        for i in 0..self.unary_watched_clauses.len() {
            self.ca.reloc(to, &mut self.unary_watched_clauses[i]);
        }

        // All originals, dropping removed ones from the list.
        let mut kept = 0;
        for i in 0..self.clauses.len() {
            let mut cref = self.clauses[i];
            if !self.ca.removed(cref) {
                self.ca.reloc(to, &mut cref);
                self.clauses[kept] = cref;
                kept += 1;
            }
        }
        self.clauses.truncate(kept);
    }

    // Reporting.

    /// An estimate of search progress from the density of low levels.
    pub(crate) fn progress_estimate(&self) -> f64 {
        let mut progress = 0.0;
        let f = 1.0 / self.atom_count() as f64;
        for level in 0..=self.decision_level() {
            let begin = if level == 0 { 0 } else { self.trail_lim[level - 1] };
            let end = if level == self.decision_level() {
                self.trail.len()
            } else {
                self.trail_lim[level]
            };
            progress += f.powi(level as i32) * (end - begin) as f64;
        }
        progress / self.atom_count() as f64
    }

    /// Log the accumulated statistics.
    pub fn log_stats(&self) {
        let restarts = self.restart.total_restarts();
        log::info!("c restarts              : {restarts}");
        log::info!(
            "c glucose restarts      : {} (blocked: {})",
            self.restart.glucose.restarts,
            self.restart.glucose.blocked
        );
        log::info!("c reduce calls          : {}", self.manager.reduce_count);
        log::info!("c clauses removed       : {}", self.manager.removed_count);
        log::info!("c learnts glue          : {}", self.stats.glue_learnts);
        log::info!("c learnts size 2        : {}", self.stats.binary_learnts);
        log::info!("c learnts size 1        : {}", self.stats.unit_learnts);
        log::info!("c conflicts             : {}", self.counters.conflicts);
        log::info!(
            "c decisions             : {} ({} random)",
            self.counters.decisions,
            self.counters.rnd_decisions
        );
        log::info!("c propagations          : {}", self.counters.propagations);
        log::info!("c regimes               : {}", self.regime_changes);
        log::info!("c sequence              : {}", self.phases_used);
        log::info!(
            "c vivification          : {} / {}",
            self.stats.lcm_shrunk,
            self.stats.lcm_tested
        );
        log::info!(
            "c binary resolution     : {}",
            self.stats.binary_resolutions
        );
        log::info!(
            "c self subsumptions     : {}",
            self.stats.self_subsumptions
        );
        if self.config.walk {
            log::info!(
                "c walk flips            : {} ({} walks)",
                self.stats.flips,
                self.stats.walks
            );
        }
        if self.exchange.is_some() {
            self.exchange_stats.log();
        }
    }
}
