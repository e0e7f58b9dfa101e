//! Assumption-based solving.

use tern_sat::config::Config;
use tern_sat::reports::Report;
use tern_sat::structures::literal::Literal;
use tern_tests::solver_for;

#[test]
fn assumptions_guide_the_model() {
    let mut solver = solver_for("p cnf 2 1\n1 2 0\n", &Config::default()).unwrap();

    let not_one = Literal::from_dimacs(-1);
    assert_eq!(solver.solve_with(&[not_one]), Report::Satisfiable);
    assert_eq!(solver.model_value(0), Some(false));
    assert_eq!(solver.model_value(1), Some(true));
}

#[test]
fn conflicting_assumptions_report_a_core() {
    // 1 → 2 and 2 → 3, assumed 1 and ¬3.
    let mut solver = solver_for("p cnf 3 2\n-1 2 0\n-2 3 0\n", &Config::default()).unwrap();

    let one = Literal::from_dimacs(1);
    let not_three = Literal::from_dimacs(-3);
    assert_eq!(solver.solve_with(&[one, not_three]), Report::Unsatisfiable);

    // The final conflict speaks in assumptions.
    assert!(!solver.conflict.is_empty());
    for literal in &solver.conflict {
        let negated = !*literal;
        assert!(
            [one, not_three].contains(&negated),
            "conflict literal {literal} is not a negated assumption"
        );
    }

    // The formula itself is still satisfiable.
    assert_eq!(solver.solve(), Report::Satisfiable);
    assert!(solver.okay());
}

#[test]
fn assumption_against_a_unit() {
    let mut solver = solver_for("p cnf 1 1\n1 0\n", &Config::default()).unwrap();
    let not_one = Literal::from_dimacs(-1);
    assert_eq!(solver.solve_with(&[not_one]), Report::Unsatisfiable);
    assert_eq!(solver.solve(), Report::Satisfiable);
}
