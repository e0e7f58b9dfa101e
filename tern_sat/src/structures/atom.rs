//! Atoms.
//!
//! An atom is a Boolean variable, represented as an index into the various
//! per-variable stores of a [Solver](crate::solver::Solver).
//! Atoms are created in order at parse time and are never destroyed.

/// An atom, aka. a Boolean variable.
pub type Atom = usize;
