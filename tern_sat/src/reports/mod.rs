//! Reports from a solve, and the DRAT proof writer.

pub mod drat;

use std::fmt;

/// The outcome of a solve.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Report {
    /// The formula is satisfiable, and a model is available.
    Satisfiable,

    /// The formula is unsatisfiable (possibly under assumptions).
    Unsatisfiable,

    /// A budget or interrupt ended the solve first.
    Unknown,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Report::Satisfiable => write!(f, "s SATISFIABLE"),
            Report::Unsatisfiable => write!(f, "s UNSATISFIABLE"),
            Report::Unknown => write!(f, "s INDETERMINATE"),
        }
    }
}

impl Report {
    /// The conventional exit code for the outcome.
    pub fn exit_code(self) -> i32 {
        match self {
            Report::Satisfiable => 10,
            Report::Unsatisfiable => 20,
            Report::Unknown => 0,
        }
    }
}
