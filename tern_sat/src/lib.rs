//! A library for determining the satisfiability of Boolean formulas written
//! in conjunctive normal form.
//!
//! The solver is built around conflict-driven clause learning, with a
//! stochastic local-search engine used as a phase oracle: search alternates
//! between a *focus* regime (glucose restarts, fast activity decay) and a
//! *stable* regime (luby restarts, slow decay) in which decision polarities
//! chase a periodically rewritten target phase, drawn from the best trail
//! prefix seen, its inversions, randomness, or a run of the walker.
//!
//! # Orientation
//!
//! At a high level a solve manipulates a handful of databases:
//!
//! - Clauses live in an [arena](db::arena) and are addressed by handle.
//! - Learnt clauses are partitioned into tiers by the
//!   [manager](db::manager), each tier with its own eviction policy.
//! - The valuation, trail, and per-atom heuristics live on the
//!   [Solver](solver::Solver) itself.
//!
//! The algorithm is factored into [procedures]; the
//! [search driver](procedures::search) is the place to start reading.
//!
//! # Example
//!
//! ```rust
//! use tern_sat::config::Config;
//! use tern_sat::reports::Report;
//! use tern_sat::solver::Solver;
//!
//! let mut solver = Solver::new(Config::default());
//! solver.read_dimacs("p cnf 2 2\n1 2 0\n-1 2 0\n".as_bytes()).unwrap();
//!
//! assert_eq!(solver.solve(), Report::Satisfiable);
//! assert_eq!(solver.model_value(1), Some(true));
//! ```
//!
//! # Determinism
//!
//! All randomness flows from a single xorshift generator seeded by the
//! configuration; the same seed and input give the same solve, statistics
//! included.
//!
//! # Logs
//!
//! Diagnostics go through [log], with a target per subsystem (listed in
//! [misc::log::targets]); pair with an implementation such as env_logger
//! to filter, e.g. `RUST_LOG=reduction=debug`.

pub mod builder;
pub mod config;
pub mod db;
pub mod exchange;
pub mod generic;
pub mod misc;
pub mod phase;
pub mod procedures;
pub mod reports;
pub mod restart;
pub mod solver;
pub mod structures;
pub mod trail_saving;
pub mod types;
pub mod walk;
