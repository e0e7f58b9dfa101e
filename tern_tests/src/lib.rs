//! Utilities shared by the integration tests: formula generators, an
//! independent model checker, and a DRAT replay checker.

pub mod drat;

use std::sync::{Arc, Mutex};

use tern_sat::config::Config;
use tern_sat::reports::Report;
use tern_sat::solver::Solver;
use tern_sat::types::err::{self, ErrorKind};

/// A solver loaded with `dimacs`.
pub fn solver_for(dimacs: &str, config: &Config) -> Result<Solver, ErrorKind> {
    let mut solver = Solver::new(config.clone());
    solver.read_dimacs(dimacs.as_bytes())?;
    Ok(solver)
}

/// Solve `dimacs` and report, checking any model against the formula.
pub fn report_on(dimacs: &str, config: &Config) -> Report {
    match solver_for(dimacs, config) {
        Err(ErrorKind::Build(err::BuildError::Unsatisfiable)) => Report::Unsatisfiable,
        Err(e) => panic!("failed to load formula: {e}"),
        Ok(mut solver) => {
            let report = solver.solve();
            if report == Report::Satisfiable {
                assert!(
                    model_satisfies(&solver, dimacs),
                    "reported model falsifies the formula"
                );
            }
            report
        }
    }
}

/// Check the solver's model against the formula text, independently of the
/// solver's own clause database.
pub fn model_satisfies(solver: &Solver, dimacs: &str) -> bool {
    for clause in clauses_of(dimacs) {
        let satisfied = clause.iter().any(|&int| {
            let atom = int.unsigned_abs() as usize - 1;
            match solver.model_value(atom) {
                Some(value) => value == (int > 0),
                None => false,
            }
        });
        if !satisfied {
            return false;
        }
    }
    true
}

/// The clauses of a DIMACS string, as signed integers.
pub fn clauses_of(dimacs: &str) -> Vec<Vec<i32>> {
    let mut clauses = Vec::new();
    let mut clause = Vec::new();
    for line in dimacs.lines() {
        let line = line.trim();
        if line.starts_with('c') || line.starts_with('p') || line.is_empty() {
            continue;
        }
        if line.starts_with('%') {
            break;
        }
        for field in line.split_whitespace() {
            let int: i32 = field.parse().expect("a DIMACS integer");
            if int == 0 {
                clauses.push(std::mem::take(&mut clause));
            } else {
                clause.push(int);
            }
        }
    }
    if !clause.is_empty() {
        clauses.push(clause);
    }
    clauses
}

/// The pigeonhole principle over `holes + 1` pigeons and `holes` holes, as
/// DIMACS. Unsatisfiable for every `holes ≥ 1`.
///
/// Variable `p·holes + h + 1` places pigeon `p` in hole `h`.
pub fn pigeonhole(holes: usize) -> String {
    let pigeons = holes + 1;
    let var = |p: usize, h: usize| (p * holes + h + 1) as i32;

    let mut clauses = Vec::new();
    for p in 0..pigeons {
        clauses.push((0..holes).map(|h| var(p, h)).collect::<Vec<_>>());
    }
    for h in 0..holes {
        for p in 0..pigeons {
            for q in p + 1..pigeons {
                clauses.push(vec![-var(p, h), -var(q, h)]);
            }
        }
    }

    render(pigeons * holes, &clauses)
}

/// A uniform random 3-SAT instance.
pub fn random_3sat(atoms: usize, clauses: usize, seed: u64) -> String {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let mut body = Vec::with_capacity(clauses);
    while body.len() < clauses {
        let mut clause = Vec::new();
        while clause.len() < 3 {
            let atom = rng.gen_range(1..=atoms as i32);
            if clause.iter().any(|&l: &i32| l.abs() == atom) {
                continue;
            }
            let negated = rng.gen_bool(0.5);
            clause.push(if negated { -atom } else { atom });
        }
        body.push(clause);
    }

    render(atoms, &body)
}

/// A DIMACS rendering of `clauses` over `atoms` atoms.
pub fn render(atoms: usize, clauses: &[Vec<i32>]) -> String {
    let mut out = format!("p cnf {} {}\n", atoms, clauses.len());
    for clause in clauses {
        for literal in clause {
            out.push_str(&literal.to_string());
            out.push(' ');
        }
        out.push_str("0\n");
    }
    out
}

/// A writable handle into a shared buffer, for capturing proof streams.
#[derive(Clone, Default)]
pub struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().expect("sink lock").clone()
    }
}

impl std::io::Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("sink lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
