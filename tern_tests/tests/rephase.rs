//! Rephasing behaviour in the stable regime.

use tern_sat::config::{Config, SearchMode};
use tern_sat::reports::Report;
use tern_tests::{model_satisfies, render, solver_for};

/// Every pair `xi ∨ xj` over `atoms` atoms, plus the unit `x1`: satisfied
/// by any assignment with at most one atom false.
fn pairs_formula(atoms: usize) -> String {
    let mut clauses = Vec::new();
    clauses.push(vec![1]);
    for i in 1..=atoms as i32 {
        for j in i + 1..=atoms as i32 {
            clauses.push(vec![i, j]);
        }
    }
    render(atoms, &clauses)
}

#[test]
fn stable_search_converges_on_pairs() {
    let dimacs = pairs_formula(50);
    let config = Config {
        search_mode: SearchMode::Stable,
        walk: false,
        ..Config::default()
    };
    let mut solver = solver_for(&dimacs, &config).unwrap();
    solver.set_conflict_budget(50_000);
    assert_eq!(solver.solve_limited(&[]), Report::Satisfiable);
    assert!(model_satisfies(&solver, &dimacs));
}

#[test]
fn stable_search_with_walking() {
    let dimacs = pairs_formula(30);
    let config = Config {
        search_mode: SearchMode::Stable,
        ..Config::default()
    };
    let mut solver = solver_for(&dimacs, &config).unwrap();
    assert_eq!(solver.solve(), Report::Satisfiable);
    assert!(model_satisfies(&solver, &dimacs));
}

#[test]
fn target_mode_agrees_with_focus_mode() {
    let dimacs = pairs_formula(20);
    for mode in [SearchMode::Target, SearchMode::Focus, SearchMode::Stable] {
        let config = Config {
            search_mode: mode,
            ..Config::default()
        };
        let mut solver = solver_for(&dimacs, &config).unwrap();
        assert_eq!(solver.solve(), Report::Satisfiable, "{mode:?}");
    }
}
