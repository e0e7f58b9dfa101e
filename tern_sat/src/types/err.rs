/*!
Error types used in the library.

Two of these are internally *expected* and steer the flow of a solve:

- A contradiction surfaces as [BuildError::Unsatisfiable] when adding
  clauses, and as an unsatisfiable report from a solve.
- Resource exhaustion (budgets, interrupts) is not an error at all: the
  solve reports unknown.

Everything else marks malformed input or a programmer error.
*/

use std::fmt;

/// A union of varied error kinds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// An error when building a formula.
    Build(BuildError),

    /// An error related to parsing.
    Parse(ParseError),
}

/// Noted errors when building a formula.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildError {
    /// The formula is unsatisfiable by unit propagation alone.
    Unsatisfiable,
}

impl From<BuildError> for ErrorKind {
    fn from(e: BuildError) -> Self {
        ErrorKind::Build(e)
    }
}

/// Errors during parsing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// Some issue with the problem line of a DIMACS input.
    ProblemSpecification,

    /// Some unspecific problem at a specific line.
    Line(usize),

    /// An input/output failure while reading.
    Io,
}

impl From<ParseError> for ErrorKind {
    fn from(e: ParseError) -> Self {
        ErrorKind::Parse(e)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Build(BuildError::Unsatisfiable) => {
                write!(f, "formula is unsatisfiable")
            }
            ErrorKind::Parse(ParseError::ProblemSpecification) => {
                write!(f, "malformed problem line")
            }
            ErrorKind::Parse(ParseError::Line(n)) => write!(f, "parse failure at line {n}"),
            ErrorKind::Parse(ParseError::Io) => write!(f, "read failure"),
        }
    }
}
