/*!
Trail saving across non-chronological backtracks.

A backjump over more than one level throws away a stretch of propagations
that the search will often rebuild verbatim. When enabled, the discarded
segment and each entry's reason are copied aside on backtrack; during later
propagation, whenever the literal leaving the queue matches the head of the
saved trail, the remainder is replayed directly from the saved reasons.
The replay stops when a saved entry lacks a reason, conflicts with the
current valuation (in which case the saved reason is returned as the
conflict), or falls out of step and is abandoned.

The saved trail is reset by anything that invalidates reasons: backtracking
itself, reductions, vivification, and relocation are all expected to call
[reset](TrailSaving::reset) or re-save.
*/

use crate::db::arena::CRef;
use crate::solver::Solver;
use crate::structures::literal::Literal;

/// The saved trail segment and its reasons.
pub struct TrailSaving {
    pub active: bool,
    pub(crate) old_trail: Vec<Literal>,
    /// Reason per atom, for atoms on the saved trail.
    pub(crate) old_reasons: Vec<CRef>,
    pub(crate) qhead: usize,
}

impl TrailSaving {
    pub fn new(active: bool) -> Self {
        TrailSaving {
            active,
            old_trail: Vec::new(),
            old_reasons: Vec::new(),
            qhead: 0,
        }
    }

    /// Size the reason store, once atoms are known.
    pub fn initialize(&mut self, atoms: usize) {
        self.old_reasons.resize(atoms, CRef::UNDEF);
    }

    /// Drop the saved segment and clear its reasons.
    pub fn reset(&mut self) {
        for i in 0..self.old_trail.len() {
            self.old_reasons[self.old_trail[i].atom()] = CRef::UNDEF;
        }
        self.old_trail.clear();
        self.qhead = 0;
    }
}

impl Solver {
    /// Begin saving if the backtrack to `level` jumps over a level.
    ///
    /// Returns whether [save_trail_entry](Solver::save_trail_entry) should
    /// be called for each cancelled trail position.
    pub(crate) fn save_trail_on_backtrack(&mut self, level: usize) -> bool {
        if !self.trail_saving.active {
            return false;
        }
        self.trail_saving.reset();
        let saving = self.decision_level() - level > 1;
        if saving {
            let segment = self.trail.len() - self.trail_lim[level];
            self.trail_saving
                .old_trail
                .resize(segment, Literal::UNDEF);
        }
        saving
    }

    /// Save the trail entry at position `index`, cancelled back to `level`.
    pub(crate) fn save_trail_entry(&mut self, index: usize, level: usize) {
        let literal = self.trail[index];
        self.trail_saving.old_trail[index - self.trail_lim[level]] = literal;
        self.trail_saving.old_reasons[literal.atom()] = self.vardata[literal.atom()].reason;
    }

    /// Replay the saved trail behind `p`, if it lines up.
    ///
    /// Returns a conflicting saved reason, if the replay finds one.
    pub(crate) fn replay_saved_trail(&mut self, p: Literal) -> Option<CRef> {
        if !self.trail_saving.active {
            return None;
        }

        let head = match self.trail_saving.old_trail.get(self.trail_saving.qhead) {
            Some(&literal) => literal,
            None => return None,
        };

        if p == head {
            while self.trail_saving.qhead + 1 < self.trail_saving.old_trail.len() {
                self.trail_saving.qhead += 1;
                let next = self.trail_saving.old_trail[self.trail_saving.qhead];
                let reason = self.trail_saving.old_reasons[next.atom()];
                if reason == CRef::UNDEF {
                    // A decision: the replay has nothing to assert.
                    break;
                }
                match self.value_literal(next) {
                    Some(false) => return Some(reason),
                    None => self.unchecked_enqueue(next, reason),
                    Some(true) => {}
                }
            }
        } else if p.atom() == head.atom() {
            // The same atom went the other way; the segment is stale.
            self.trail_saving.reset();
        } else if self.value_literal(head) == Some(false) {
            self.trail_saving.reset();
        }

        None
    }
}
