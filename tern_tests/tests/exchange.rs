//! Clause exchange endpoints, driven from the test side of the channels.

use crossbeam::channel::{unbounded, Receiver, Sender};
use tern_sat::config::Config;
use tern_sat::exchange::Exchange;
use tern_sat::reports::Report;
use tern_sat::solver::Solver;
use tern_sat::structures::literal::Literal;

struct Broker {
    unit_in: Sender<Literal>,
    unit_out: Receiver<Literal>,
    two_in: Sender<Vec<Literal>>,
    #[allow(dead_code)]
    two_out: Receiver<Vec<Literal>>,
    one_in: Sender<Vec<Literal>>,
    #[allow(dead_code)]
    one_out: Receiver<Vec<Literal>>,
}

fn wire(solver: &mut Solver) -> Broker {
    let (unit_out_tx, unit_out_rx) = unbounded();
    let (unit_in_tx, unit_in_rx) = unbounded();
    let (two_out_tx, two_out_rx) = unbounded();
    let (two_in_tx, two_in_rx) = unbounded();
    let (one_out_tx, one_out_rx) = unbounded();
    let (one_in_tx, one_in_rx) = unbounded();

    solver.set_exchange(Exchange {
        unit_out: unit_out_tx,
        unit_in: unit_in_rx,
        two_watched_out: two_out_tx,
        two_watched_in: two_in_rx,
        one_watched_out: one_out_tx,
        one_watched_in: one_in_rx,
    });

    Broker {
        unit_in: unit_in_tx,
        unit_out: unit_out_rx,
        two_in: two_in_tx,
        two_out: two_out_rx,
        one_in: one_in_tx,
        one_out: one_out_rx,
    }
}

#[test]
fn imported_units_bind_the_model() {
    let mut solver = Solver::new(Config::default());
    solver.read_dimacs("p cnf 2 1\n-1 2 0\n".as_bytes()).unwrap();
    let broker = wire(&mut solver);

    broker.unit_in.send(Literal::from_dimacs(1)).unwrap();

    assert_eq!(solver.solve(), Report::Satisfiable);
    assert_eq!(solver.model_value(0), Some(true));
    assert_eq!(solver.model_value(1), Some(true));
}

#[test]
fn contradictory_import_settles_unsatisfiable() {
    let mut solver = Solver::new(Config::default());
    solver.read_dimacs("p cnf 1 1\n1 0\n".as_bytes()).unwrap();
    let broker = wire(&mut solver);

    broker.unit_in.send(Literal::from_dimacs(-1)).unwrap();

    assert_eq!(solver.solve(), Report::Unsatisfiable);
}

#[test]
fn imported_clauses_are_respected() {
    let mut solver = Solver::new(Config::default());
    solver
        .read_dimacs("p cnf 4 2\n1 2 3 0\n-3 4 0\n".as_bytes())
        .unwrap();
    let broker = wire(&mut solver);

    // A binary via the two-watched channel, a longer candidate via the
    // purgatory channel.
    broker
        .two_in
        .send(vec![Literal::from_dimacs(-1), Literal::from_dimacs(2)])
        .unwrap();
    broker
        .one_in
        .send(vec![
            Literal::from_dimacs(-2),
            Literal::from_dimacs(-3),
            Literal::from_dimacs(-4),
        ])
        .unwrap();

    assert_eq!(solver.solve(), Report::Satisfiable);
}

#[test]
fn learnt_units_are_exported() {
    // Any decision on atom 1 propagates a conflict through the first two
    // clauses, learning the unit 1.
    let mut solver = Solver::new(Config::default());
    solver
        .read_dimacs("p cnf 3 3\n1 2 0\n1 -2 0\n-1 3 0\n".as_bytes())
        .unwrap();
    let broker = wire(&mut solver);

    assert_eq!(solver.solve(), Report::Satisfiable);
    assert_eq!(broker.unit_out.try_recv(), Ok(Literal::from_dimacs(1)));
}
