//! Backtracking.
//!
//! Reverts the solver to a given decision level: assignments above the
//! level are undone newest-first, their atoms return to the decision order,
//! and (per the configured level of phase saving) their values are saved as
//! the preferred polarity for the next decision on the atom. When trail
//! saving is active and the jump spans more than one level, the cancelled
//! segment is saved for replay (see [trail saving](crate::trail_saving)).

use crate::config::PhaseSaving;
use crate::misc::log::targets;
use crate::solver::Solver;

impl Solver {
    /// Revert to `level`, keeping assignments at the level but not beyond.
    pub(crate) fn cancel_until(&mut self, level: usize) {
        self.trail_saving.reset();
        if self.decision_level() <= level {
            return;
        }
        log::trace!(
            target: targets::BACKJUMP,
            "Backjump from {} to {level}",
            self.decision_level()
        );

        let saving = self.save_trail_on_backtrack(level);
        let keep = self.trail_lim[level];

        for position in (keep..self.trail.len()).rev() {
            if saving {
                self.save_trail_entry(position, level);
            }
            let literal = self.trail[position];
            let atom = literal.atom();
            self.assigns[atom] = None;

            let save_phase = match self.config.phase_saving {
                PhaseSaving::Full => true,
                PhaseSaving::Limited => position > *self.trail_lim.last().expect("level > 0"),
                PhaseSaving::None => false,
            };
            if save_phase {
                self.saved_phase[atom] = literal.polarity();
            }

            self.insert_var_order(atom);
        }

        self.qhead = keep;
        self.trail.truncate(keep);
        self.trail_lim.truncate(level);
    }
}
