/*!
Typed clause-exchange endpoints for parallel portfolios.

The orchestration layer that runs several solvers and brokers their traffic
lives outside this crate. What the core owns are three typed channels, and
the entry points that drain and fill them:

1. unit literals,
2. very good ("two-watched") clauses, with LBD ≤ 2,
3. candidate ("one-watched") clauses. Imports happen at decision
level 0, before propagation: units are enqueued, two-watched clauses join
the core tier, and one-watched clauses are parked in the purgatory on a
single watch until a propagation proves them useful (see
[bcp](crate::procedures::bcp)). Everything crosses the channels by value;
no clause state is shared between solvers.

A clause is exported at most twice (the `exported` counter caps at 2), and
imported clauses are never re-exported.
*/

use crossbeam::channel::{Receiver, Sender};

use crate::db::arena::{CRef, Tier};
use crate::misc::log::targets;
use crate::solver::Solver;
use crate::structures::clause::ClauseSource;
use crate::structures::literal::Literal;

/// Endpoints wired to the rest of a portfolio.
pub struct Exchange {
    pub unit_out: Sender<Literal>,
    pub unit_in: Receiver<Literal>,
    pub two_watched_out: Sender<Vec<Literal>>,
    pub two_watched_in: Receiver<Vec<Literal>>,
    pub one_watched_out: Sender<Vec<Literal>>,
    pub one_watched_in: Receiver<Vec<Literal>>,
}

/// Counters for imported and exported clauses.
#[derive(Default)]
pub struct ExchangeStats {
    pub imported_units: u64,
    pub exported_units: u64,
    pub imported_two_watched: u64,
    pub exported_two_watched: u64,
    pub imported_one_watched: u64,
    pub exported_one_watched: u64,
    pub good_imported: u64,
    pub removed_in_purgatory: u64,
}

impl ExchangeStats {
    pub fn log(&self) {
        log::info!("c unit imported         : {}", self.imported_units);
        log::info!("c unit exported         : {}", self.exported_units);
        log::info!("c 2W   imported         : {}", self.imported_two_watched);
        log::info!("c 2W   exported         : {}", self.exported_two_watched);
        log::info!("c 1W   imported         : {}", self.imported_one_watched);
        log::info!("c 1W   exported         : {}", self.exported_one_watched);
        log::info!("c good imported         : {}", self.good_imported);
        log::info!("c 1W   removed          : {}", self.removed_in_purgatory);
    }
}

impl Solver {
    /// Wire the solver into a portfolio.
    ///
    /// Switches the purgatory (single-watch) scheme on.
    pub fn set_exchange(&mut self, exchange: Exchange) {
        self.use_unary_watched = true;
        self.exchange = Some(exchange);
    }

    /// Drain every import channel at decision level 0.
    ///
    /// Returns false when an import contradicts the level-0 valuation,
    /// proving the formula unsatisfiable.
    pub(crate) fn import_clauses(&mut self) -> bool {
        debug_assert!(self.decision_level() == 0);
        if self.exchange.is_none() {
            return true;
        }

        if !self.import_units() {
            return false;
        }

        // Two-watched, then one-watched candidates.
        loop {
            let received = match &self.exchange {
                Some(exchange) => exchange.two_watched_in.try_recv().ok(),
                None => None,
            };
            let Some(lits) = received else { break };
            match self.prepare_import(lits) {
                Import::Satisfied => {}
                Import::Empty => return false,
                Import::Unit(literal) => self.unchecked_enqueue(literal, CRef::UNDEF),
                Import::Clause(lits) => self.import_two_watched(&lits),
            }
        }

        loop {
            let received = match &self.exchange {
                Some(exchange) => exchange.one_watched_in.try_recv().ok(),
                None => None,
            };
            let Some(lits) = received else { break };
            match self.prepare_import(lits) {
                Import::Satisfied => {}
                Import::Empty => return false,
                Import::Unit(literal) => self.unchecked_enqueue(literal, CRef::UNDEF),
                Import::Clause(lits) => self.import_one_watched(&lits),
            }
        }

        true
    }

    fn import_units(&mut self) -> bool {
        loop {
            let received = match &self.exchange {
                Some(exchange) => exchange.unit_in.try_recv().ok(),
                None => None,
            };
            let Some(literal) = received else { break };
            match self.value_literal(literal) {
                Some(false) => return false,
                None => {
                    self.unchecked_enqueue(literal, CRef::UNDEF);
                    self.exchange_stats.imported_units += 1;
                }
                Some(true) => {}
            }
        }
        true
    }

    fn import_two_watched(&mut self, lits: &[Literal]) {
        let cref = self.ca.alloc(lits, ClauseSource::Learnt);
        self.ca.set_lbd(cref, 2);
        self.ca.set_imported(cref, true);
        self.ca.set_location(cref, Tier::Core);
        self.learnts_core.push(cref);
        self.attach_clause(cref);
        self.exchange_stats.imported_two_watched += 1;
    }

    fn import_one_watched(&mut self, lits: &[Literal]) {
        let cref = self.ca.alloc(lits, ClauseSource::Learnt);
        self.ca.set_lbd(cref, lits.len() as u32 - 1);
        self.ca.set_imported(cref, true);
        self.unary_watched_clauses.push(cref);
        self.attach_clause_purgatory(cref);
        self.ca.set_one_watched(cref, true);
        self.exchange_stats.imported_one_watched += 1;
    }

    /// Shrink a received clause against the level-0 valuation.
    fn prepare_import(&self, mut lits: Vec<Literal>) -> Import {
        let mut kept = 0;
        for i in 0..lits.len() {
            match self.value_literal(lits[i]) {
                Some(true) => return Import::Satisfied,
                Some(false) => {}
                None => {
                    lits[kept] = lits[i];
                    kept += 1;
                }
            }
        }
        lits.truncate(kept);
        match lits.len() {
            0 => Import::Empty,
            1 => Import::Unit(lits[0]),
            _ => Import::Clause(lits),
        }
    }

    /// Share a learnt unit.
    pub(crate) fn export_unit(&mut self, literal: Literal) {
        if let Some(exchange) = &self.exchange {
            let _ = exchange.unit_out.send(literal);
            self.exchange_stats.exported_units += 1;
        }
    }

    /// Share a clause just learnt, if its LBD marks it very good.
    pub(crate) fn export_clause_during_search(&mut self, cref: CRef) {
        if self.exchange.is_none() || self.ca.lbd(cref) > 2 {
            return;
        }
        if self.ca.size(cref) == 2 {
            self.export_two_watched(cref);
        } else {
            self.export_one_watched(cref);
        }
    }

    /// Share a clause that keeps taking part in conflict analysis.
    pub(crate) fn export_clause_during_analysis(&mut self, cref: CRef) {
        const GOOD_LIMIT_SIZE: usize = 15;
        const GOOD_LIMIT_LBD: u32 = 5;

        if self.exchange.is_none() {
            return;
        }
        if self.ca.imported(cref)
            || self.ca.exported(cref) == 2
            || self.counters.conflicts <= 5000
        {
            return;
        }
        self.ca.set_exported(cref, self.ca.exported(cref) + 1);

        if self.ca.lbd(cref) == 2
            || (self.ca.exported(cref) == 2
                && self.ca.size(cref) < GOOD_LIMIT_SIZE
                && self.ca.lbd(cref) <= GOOD_LIMIT_LBD)
        {
            self.export_one_watched(cref);
            self.ca.set_exported(cref, 2);
        }
    }

    fn export_two_watched(&mut self, cref: CRef) {
        if let Some(exchange) = &self.exchange {
            log::trace!(target: targets::EXCHANGE, "Export 2W {cref:?}");
            let _ = exchange.two_watched_out.send(self.ca.lits(cref).to_vec());
            self.ca.set_exported(cref, 2);
            self.exchange_stats.exported_two_watched += 1;
        }
    }

    fn export_one_watched(&mut self, cref: CRef) {
        if let Some(exchange) = &self.exchange {
            log::trace!(target: targets::EXCHANGE, "Export 1W {cref:?}");
            let _ = exchange.one_watched_out.send(self.ca.lits(cref).to_vec());
            self.ca.set_exported(cref, 2);
            self.exchange_stats.exported_one_watched += 1;
        }
    }
}

enum Import {
    Satisfied,
    Empty,
    Unit(Literal),
    Clause(Vec<Literal>),
}
