use tern_sat::config::Config;
use tern_sat::reports::Report;
use tern_tests::{report_on, solver_for};

#[test]
fn single_unit() {
    let mut solver = solver_for("p cnf 1 1\n1 0\n", &Config::default()).unwrap();
    assert_eq!(solver.solve(), Report::Satisfiable);
    assert_eq!(solver.model_value(0), Some(true));
}

#[test]
fn contradictory_units() {
    assert_eq!(
        report_on("p cnf 1 2\n1 0\n-1 0\n", &Config::default()),
        Report::Unsatisfiable
    );
}

#[test]
fn chain_of_implications() {
    let mut solver =
        solver_for("p cnf 3 3\n1 2 0\n-1 2 0\n-2 3 0\n", &Config::default()).unwrap();
    assert_eq!(solver.solve(), Report::Satisfiable);
    assert_eq!(solver.model_value(1), Some(true));
    assert_eq!(solver.model_value(2), Some(true));
}

#[test]
fn empty_formula() {
    assert_eq!(report_on("p cnf 3 0\n", &Config::default()), Report::Satisfiable);
}

#[test]
fn all_assignments_excluded() {
    let dimacs = "p cnf 2 4\n1 2 0\n1 -2 0\n-1 2 0\n-1 -2 0\n";
    assert_eq!(report_on(dimacs, &Config::default()), Report::Unsatisfiable);
}

#[test]
fn parity_of_three() {
    // x1 ⊕ x2 ⊕ x3 = 1, alongside x1 = x2 = x3: satisfied only by all-true.
    let dimacs = "p cnf 3 8\n\
        1 2 3 0\n1 -2 -3 0\n-1 2 -3 0\n-1 -2 3 0\n\
        -1 2 0\n-2 3 0\n-3 1 0\n\
        1 0\n";
    let mut solver = solver_for(dimacs, &Config::default()).unwrap();
    assert_eq!(solver.solve(), Report::Satisfiable);
    for atom in 0..3 {
        assert_eq!(solver.model_value(atom), Some(true));
    }
}

#[test]
fn solver_reusable_after_sat() {
    let mut solver = solver_for("p cnf 2 1\n1 2 0\n", &Config::default()).unwrap();
    assert_eq!(solver.solve(), Report::Satisfiable);
    assert_eq!(solver.solve(), Report::Satisfiable);
}
