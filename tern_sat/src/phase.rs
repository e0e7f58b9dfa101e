/*!
The target-phase (rephasing) controller.

During stable search the solver records the deepest level-1 trail prefix
seen so far as the *best phase*. Every so often (after 1000 conflicts, then
on a slowing schedule) the target polarity vector is rewritten according to
a cyclic sequence of phase tags:

| tag | effect on the target polarities |
|---|---|
| `B` | copy the best phase |
| `F` | flip every set entry |
| `O` | propose true everywhere |
| `I` | propose false everywhere |
| `R` | random per atom |
| `W` | run the local-search engine; adopt its best assignment |

Decisions then prefer the target polarity over the saved phase whenever a
target is set (see [pick_branch](crate::solver::Solver)). A walk that
satisfies every clause ends the whole solve.

The default cycle is `BW BO BI BW BR BF` when walking is enabled and the
instance is small enough, `BO BI BR BF` otherwise.
*/

use crate::misc::log::targets;
use crate::reports::Report;
use crate::solver::Solver;

/// One step of the rephasing cycle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PhaseTag {
    Best,
    Flipped,
    Original,
    Inverted,
    Random,
    Walk,
}

/// State of the rephasing state machine.
pub struct PhaseState {
    pub(crate) next_rephasing: u64,
    pub(crate) size_best_phase: usize,
    pub(crate) size_best_ever: usize,
    pub(crate) min_size: usize,
    pub(crate) rephasings: u64,
    pub(crate) cycle: Vec<PhaseTag>,
    pub(crate) best_polarity: Vec<Option<bool>>,
    pub(crate) max_atoms_for_walker: usize,
}

impl Default for PhaseState {
    fn default() -> Self {
        PhaseState {
            next_rephasing: 1000,
            size_best_phase: 0,
            size_best_ever: 0,
            min_size: 0,
            rephasings: 0,
            cycle: Vec::new(),
            best_polarity: Vec::new(),
            max_atoms_for_walker: 70_000,
        }
    }
}

/// Parse a cycle description such as `"BW BO BI BW BR BF"`.
///
/// Whitespace separates steps for the reader only; every recognised letter
/// contributes one tag.
pub fn parse_sequence(sequence: &str) -> Vec<PhaseTag> {
    let mut cycle = Vec::new();
    for c in sequence.chars() {
        match c {
            'B' => cycle.push(PhaseTag::Best),
            'F' => cycle.push(PhaseTag::Flipped),
            'O' => cycle.push(PhaseTag::Original),
            'I' => cycle.push(PhaseTag::Inverted),
            'R' => cycle.push(PhaseTag::Random),
            'W' => cycle.push(PhaseTag::Walk),
            _ => {}
        }
    }
    cycle
}

impl Solver {
    /// Size the best-phase store and fix the cycle, once atoms are known.
    pub(crate) fn phase_initialize(&mut self) {
        let atoms = self.atom_count();
        let walk = self.config.walk;
        let Some(phase) = self.phase.as_mut() else {
            return;
        };

        phase.best_polarity.resize(atoms, None);
        phase.min_size = atoms;

        if !phase.cycle.is_empty() {
            return;
        }
        if walk && atoms < phase.max_atoms_for_walker {
            phase.cycle = parse_sequence("BW BO BI BW BR BF");
        } else {
            phase.cycle = parse_sequence("BO BI BR BF");
        }
    }

    /// Whether the rephasing point has been passed.
    pub(crate) fn rephasing_due(&self) -> bool {
        match &self.phase {
            Some(phase) => phase.next_rephasing < self.counters.conflicts,
            None => false,
        }
    }

    /// Record the current level-1 prefix as best, if it is the deepest yet.
    pub(crate) fn update_best_phase(&mut self) {
        let prefix = match self.trail_lim.last() {
            Some(&last) => last,
            None => 0,
        };
        let Some(phase) = self.phase.as_mut() else {
            return;
        };

        if prefix > 0 && prefix < phase.min_size {
            phase.min_size = prefix;
        }
        if phase.size_best_phase < prefix {
            for slot in phase.best_polarity.iter_mut() {
                *slot = None;
            }
            for &literal in &self.trail[..prefix] {
                phase.best_polarity[literal.atom()] = Some(literal.polarity());
            }
            phase.size_best_phase = prefix;
            if phase.size_best_ever < prefix {
                phase.size_best_ever = prefix;
            }
        }
    }

    /// On entering stable search, restart the cycle from a best step.
    pub(crate) fn phase_reset(&mut self) {
        let Some(phase) = self.phase.as_mut() else {
            return;
        };
        if !phase.cycle.is_empty() {
            let at = phase.rephasings as usize % phase.cycle.len();
            if phase.cycle[at] != PhaseTag::Best {
                phase.rephasings = phase.rephasings.wrapping_sub(1);
            }
        }
        phase.size_best_phase = 0;
    }

    /// Apply the next step of the cycle to the target polarities.
    ///
    /// Returns a report if the walk step satisfied the formula.
    pub(crate) fn rephase(&mut self) -> Option<Report> {
        let tag = {
            let phase = self.phase.as_ref()?;
            phase.cycle[phase.rephasings as usize % phase.cycle.len()]
        };

        match tag {
            PhaseTag::Best => {
                let phase = self.phase.as_mut().expect("tag from phase state");
                log::debug!(
                    target: targets::REPHASE,
                    "B (size {} / best ever {} / min {})",
                    phase.size_best_phase,
                    phase.size_best_ever,
                    phase.min_size
                );
                self.target_phase.copy_from_slice(&phase.best_polarity);
                self.phases_used.push('B');
            }

            PhaseTag::Flipped => {
                log::debug!(target: targets::REPHASE, "F");
                for slot in self.target_phase.iter_mut() {
                    *slot = slot.map(|polarity| !polarity);
                }
                self.phases_used.push('F');
            }

            PhaseTag::Original => {
                log::debug!(target: targets::REPHASE, "O");
                for slot in self.target_phase.iter_mut() {
                    *slot = Some(true);
                }
                self.phases_used.push('O');
            }

            PhaseTag::Inverted => {
                log::debug!(target: targets::REPHASE, "I");
                for slot in self.target_phase.iter_mut() {
                    *slot = Some(false);
                }
                self.phases_used.push('I');
            }

            PhaseTag::Random => {
                log::debug!(target: targets::REPHASE, "R");
                for atom in 0..self.target_phase.len() {
                    let polarity = !(self.rng.next_double() < 0.5);
                    self.target_phase[atom] = Some(polarity);
                }
                self.phases_used.push('R');
            }

            PhaseTag::Walk => {
                self.phases_used.push('W');
                // Reboot the solver before handing over to the walker.
                self.cancel_until(0);
                if self.walk() == Some(true) {
                    return Some(Report::Satisfiable);
                }
            }
        }

        let conflicts = self.counters.conflicts;
        let phase = self.phase.as_mut().expect("rephasing requires phase state");
        phase.rephasings += 1;
        phase.next_rephasing = conflicts + phase.rephasings * 1000;
        phase.size_best_phase = 0;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_parsing() {
        assert_eq!(
            parse_sequence("BW BO"),
            vec![
                PhaseTag::Best,
                PhaseTag::Walk,
                PhaseTag::Best,
                PhaseTag::Original
            ]
        );
        assert_eq!(parse_sequence("  "), vec![]);
        assert_eq!(parse_sequence("xyzB"), vec![PhaseTag::Best]);
    }
}
