//! Choosing the next decision.
//!
//! The atom comes from the activity heap (or, with some probability, at
//! random from it). The value proposed for the atom is the target polarity
//! when the solver is chasing a target phase, and the saved phase
//! otherwise.

use crate::solver::Solver;
use crate::structures::atom::Atom;
use crate::structures::literal::Literal;

impl Solver {
    /// The next decision literal, or None when every decision atom has a
    /// value, i.e. a model has been found.
    pub(crate) fn pick_branch_lit(&mut self) -> Option<Literal> {
        let mut next: Option<Atom> = None;

        // Random decision.
        if ((self.config.randomize_first_descent && self.counters.conflicts == 0)
            || self.rng.next_double() < self.config.random_var_freq)
            && !self.order_heap.is_empty()
        {
            let atom = self.order_heap.at(self.rng.below(self.order_heap.len()));
            if self.value(atom).is_none() && self.decision[atom] {
                self.counters.rnd_decisions += 1;
            }
            next = Some(atom);
        }

        // Activity-based decision.
        loop {
            match next {
                Some(atom) if self.value(atom).is_none() && self.decision[atom] => break,
                _ => match self.order_heap.pop_max() {
                    Some(atom) => next = Some(atom),
                    None => return None,
                },
            }
        }

        let atom = next.expect("loop breaks with an atom");
        let polarity = self.pick_polarity(atom);
        Some(Literal::new(atom, polarity))
    }

    /// The value to propose for a decision on `atom`.
    fn pick_polarity(&mut self, atom: Atom) -> bool {
        if self.config.rnd_pol {
            return !(self.rng.next_double() < 0.5);
        }
        if self.regime.focus() {
            return self.saved_phase[atom];
        }
        match self.target_phase[atom] {
            Some(polarity) => polarity,
            None => self.saved_phase[atom],
        }
    }
}
