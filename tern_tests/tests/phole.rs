use tern_sat::config::{Config, ReduceMode, SearchMode};
use tern_sat::reports::Report;
use tern_tests::{pigeonhole, report_on};

#[test]
fn two_holes() {
    // Three pigeons, two holes: six atoms, nine clauses.
    assert_eq!(
        report_on(&pigeonhole(2), &Config::default()),
        Report::Unsatisfiable
    );
}

#[test]
fn middling_holes() {
    for holes in 3..=6 {
        assert_eq!(
            report_on(&pigeonhole(holes), &Config::default()),
            Report::Unsatisfiable,
            "PHP({}, {holes})",
            holes + 1
        );
    }
}

#[test]
fn holes_under_each_search_mode() {
    for mode in [SearchMode::Target, SearchMode::Focus, SearchMode::Stable] {
        let config = Config {
            search_mode: mode,
            ..Config::default()
        };
        assert_eq!(
            report_on(&pigeonhole(5), &config),
            Report::Unsatisfiable,
            "{mode:?}"
        );
    }
}

#[test]
fn holes_under_glucose_reduction() {
    let config = Config {
        reduce_mode: ReduceMode::Glucose,
        ..Config::default()
    };
    assert_eq!(report_on(&pigeonhole(6), &config), Report::Unsatisfiable);
}

#[test]
#[ignore = "expensive"]
fn tough_eight() {
    assert_eq!(
        report_on(&pigeonhole(8), &Config::default()),
        Report::Unsatisfiable
    );
}
