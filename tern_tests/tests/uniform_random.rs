//! Uniform random 3-SAT instances around the satisfiability threshold.
//!
//! Beyond answers being checked, these pin down two behavioural contracts:
//! a fixed seed gives a bit-identical solve, and optional techniques
//! (walking, vivification, trail saving, self-subsumption) change
//! statistics but never answers.

use tern_sat::config::Config;
use tern_sat::reports::Report;
use tern_tests::{random_3sat, report_on, solver_for};

/// Ratio 4.2 over 100 atoms.
fn threshold_instance(seed: u64) -> String {
    random_3sat(100, 420, seed)
}

#[test]
fn batch_is_decided() {
    for seed in 0..10 {
        let report = report_on(&threshold_instance(seed), &Config::default());
        assert_ne!(report, Report::Unknown, "seed {seed}");
    }
}

#[test]
fn fixed_seed_is_deterministic() {
    let dimacs = threshold_instance(7);

    let mut first = solver_for(&dimacs, &Config::default()).unwrap();
    let mut second = solver_for(&dimacs, &Config::default()).unwrap();

    assert_eq!(first.solve(), second.solve());
    assert_eq!(first.counters.conflicts, second.counters.conflicts);
    assert_eq!(first.counters.decisions, second.counters.decisions);
    assert_eq!(first.counters.propagations, second.counters.propagations);
}

#[test]
fn techniques_do_not_change_answers() {
    for seed in 0..6 {
        let dimacs = threshold_instance(seed);
        let baseline = report_on(&dimacs, &Config::default());

        let variants = [
            Config {
                walk: false,
                ..Config::default()
            },
            Config {
                lcm: false,
                ..Config::default()
            },
            Config {
                save_trail: true,
                ..Config::default()
            },
            Config {
                self_subsumption: true,
                ..Config::default()
            },
            Config {
                min_with_binary_resolution: true,
                ..Config::default()
            },
        ];

        for (at, config) in variants.iter().enumerate() {
            assert_eq!(
                report_on(&dimacs, config),
                baseline,
                "seed {seed}, variant {at}"
            );
        }
    }
}

#[test]
fn underconstrained_is_satisfiable() {
    // Ratio 2.0: far below the threshold.
    for seed in 0..4 {
        assert_eq!(
            report_on(&random_3sat(80, 160, seed), &Config::default()),
            Report::Satisfiable
        );
    }
}

#[test]
fn overconstrained_is_unsatisfiable() {
    // Ratio 8.0: far above the threshold.
    for seed in 0..4 {
        assert_eq!(
            report_on(&random_3sat(40, 320, seed), &Config::default()),
            Report::Unsatisfiable
        );
    }
}
