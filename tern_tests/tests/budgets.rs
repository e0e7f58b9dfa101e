//! Budgets and interrupts end a solve with an unknown report.

use tern_sat::config::Config;
use tern_sat::reports::Report;
use tern_tests::{pigeonhole, solver_for};

#[test]
fn conflict_budget_exhausts() {
    let mut solver = solver_for(&pigeonhole(8), &Config::default()).unwrap();
    solver.set_conflict_budget(10);
    assert_eq!(solver.solve_limited(&[]), Report::Unknown);
}

#[test]
fn propagation_budget_exhausts() {
    let mut solver = solver_for(&pigeonhole(8), &Config::default()).unwrap();
    solver.set_propagation_budget(100);
    assert_eq!(solver.solve_limited(&[]), Report::Unknown);
}

#[test]
fn budget_off_restores_completeness() {
    let mut solver = solver_for(&pigeonhole(4), &Config::default()).unwrap();
    solver.set_conflict_budget(1);
    assert_eq!(solver.solve_limited(&[]), Report::Unknown);

    solver.budget_off();
    assert_eq!(solver.solve_limited(&[]), Report::Unsatisfiable);
}

#[test]
fn raised_interrupt_returns_unknown() {
    let mut solver = solver_for(&pigeonhole(5), &Config::default()).unwrap();
    solver.interrupt();
    assert_eq!(solver.solve(), Report::Unknown);

    solver.clear_interrupt();
    assert_eq!(solver.solve(), Report::Unsatisfiable);
}
