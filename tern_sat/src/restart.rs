/*!
Restart controllers.

Two controllers are kept side by side and one is active at a time; strategy
switches (focus/stable mode changes, the adaptive retune) swap the active
controller without resetting either.

- The glucose controller compares a narrow exponential moving average of
  learnt-clause LBD against a wide one and restarts when recent conflicts
  look worse than the long run. Restarts are blocked while the trail is
  unusually deep, as a deep trail suggests the search is close to a model.
- The luby controller restarts on a conflict budget following the luby
  sequence scaled by a base step.

The moving averages use the robust initialisation from CaDiCaL: `beta`
starts at 1 and halves on a doubling schedule until it reaches `alpha`, so
early updates behave like a plain average rather than being dragged by the
initial value.
*/

use crate::generic::luby::Luby;

/// An exponential moving average with robust initialisation.
pub struct Ema {
    value: f64,
    alpha: f64,
    beta: f64,
    wait: u64,
    period: u64,
}

impl Ema {
    pub fn new(alpha: f64) -> Self {
        Ema {
            value: 1.0,
            alpha,
            beta: 1.0,
            wait: 1,
            period: 1,
        }
    }

    pub fn update(&mut self, next: f64) {
        self.value += self.beta * (next - self.value);

        if self.beta > self.alpha {
            self.wait -= 1;
            if self.wait == 0 {
                self.period *= 2;
                self.wait = self.period;
                self.beta *= 0.5;
                if self.beta < self.alpha {
                    self.beta = self.alpha;
                }
            }
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// The glucose (EMA ratio) restart controller.
pub struct GlucoseRestart {
    minimum_conflicts: u64,
    minimum_conflicts_for_blocking: u64,
    ema_lbd_narrow: Ema,
    ema_lbd_wide: Ema,
    ema_trail_wide: Ema,
    last_trail_size: usize,
    force: f64,
    block: f64,

    pub restarts: u64,
    pub blocked: u64,
}

impl Default for GlucoseRestart {
    fn default() -> Self {
        GlucoseRestart {
            minimum_conflicts: 50,
            minimum_conflicts_for_blocking: 10_000,
            ema_lbd_narrow: Ema::new(3e-2),
            ema_lbd_wide: Ema::new(1e-5),
            ema_trail_wide: Ema::new(3e-4),
            last_trail_size: 0,
            force: 1.25,
            block: 1.4,
            restarts: 0,
            blocked: 0,
        }
    }
}

impl GlucoseRestart {
    /// Fold the conflict just analysed into the averages.
    pub fn update(&mut self, trail_size: usize, lbd: u32) {
        self.ema_trail_wide.update(trail_size as f64);
        self.last_trail_size = trail_size;
        self.ema_lbd_narrow.update(lbd as f64);
        self.ema_lbd_wide.update(lbd as f64);
    }

    fn trigger_restart(&mut self, conflicts: u64) -> bool {
        if conflicts < self.minimum_conflicts {
            return false;
        }
        if self.ema_lbd_narrow.value() / self.ema_lbd_wide.value() > self.force {
            self.restarts += 1;
            self.minimum_conflicts = conflicts + 50;
            return true;
        }
        false
    }

    fn block_restart(&mut self, conflicts: u64) -> bool {
        if self.last_trail_size as f64 > self.block * self.ema_trail_wide.value()
            && conflicts >= self.minimum_conflicts_for_blocking
        {
            self.minimum_conflicts = conflicts + 50;
            self.blocked += 1;
            return true;
        }
        false
    }
}

/// The luby restart controller, with base step 100.
pub struct LubyRestart {
    sequence: Luby,
    step: u64,
    limit: u64,

    pub restarts: u64,
}

impl Default for LubyRestart {
    fn default() -> Self {
        LubyRestart {
            sequence: Luby::default(),
            step: 100,
            limit: 100,
            restarts: 0,
        }
    }
}

impl LubyRestart {
    fn trigger_restart(&mut self, conflicts: u64) -> bool {
        if conflicts <= self.limit {
            return false;
        }
        let unit = self.sequence.next().unwrap_or(1);
        self.limit = conflicts + unit * self.step;
        self.restarts += 1;
        true
    }
}

/// Which controller is consulted.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActiveRestart {
    Glucose,
    Luby,
}

/// Both restart controllers, with a selector.
pub struct RestartCtl {
    pub glucose: GlucoseRestart,
    pub luby: LubyRestart,
    pub active: ActiveRestart,
}

impl RestartCtl {
    pub fn new(active: ActiveRestart) -> Self {
        RestartCtl {
            glucose: GlucoseRestart::default(),
            luby: LubyRestart::default(),
            active,
        }
    }

    /// Should the search restart now?
    pub fn trigger_restart(&mut self, conflicts: u64) -> bool {
        match self.active {
            ActiveRestart::Glucose => self.glucose.trigger_restart(conflicts),
            ActiveRestart::Luby => self.luby.trigger_restart(conflicts),
        }
    }

    /// Postpone a pending restart if the trail has grown unusually deep.
    ///
    /// Only meaningful for the glucose controller.
    pub fn block_restart(&mut self, conflicts: u64) -> bool {
        match self.active {
            ActiveRestart::Glucose => self.glucose.block_restart(conflicts),
            ActiveRestart::Luby => false,
        }
    }

    pub fn total_restarts(&self) -> u64 {
        self.glucose.restarts + self.luby.restarts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_robust_initialisation() {
        // With beta starting at 1 the first update replaces the value
        // outright, rather than creeping from the initial 1 by alpha.
        let mut ema = Ema::new(3e-2);
        ema.update(10.0);
        assert_eq!(ema.value(), 10.0);

        // The second update has beta = 1/2.
        ema.update(20.0);
        assert_eq!(ema.value(), 15.0);
    }

    #[test]
    fn ema_beta_floors_at_alpha() {
        let mut ema = Ema::new(0.25);
        for _ in 0..100 {
            ema.update(1.0);
        }
        assert!(ema.beta >= ema.alpha);
        assert_eq!(ema.beta, 0.25);
    }

    #[test]
    fn glucose_triggers_on_lbd_spike() {
        let mut ctl = RestartCtl::new(ActiveRestart::Glucose);

        // A long quiet stretch, then sharply worse LBDs.
        for conflicts in 0..200 {
            ctl.glucose.update(50, 3);
            assert!(!ctl.trigger_restart(conflicts));
        }
        let mut fired = false;
        for conflicts in 200..300 {
            ctl.glucose.update(50, 30);
            if ctl.trigger_restart(conflicts) {
                fired = true;
                break;
            }
        }
        assert!(fired);
        assert_eq!(ctl.total_restarts(), 1);
    }

    #[test]
    fn glucose_floor_after_restart() {
        let mut ctl = RestartCtl::new(ActiveRestart::Glucose);
        for _ in 0..100 {
            ctl.glucose.update(50, 3);
        }
        for _ in 0..100 {
            ctl.glucose.update(50, 40);
        }
        assert!(ctl.trigger_restart(150));
        // Fifty further conflicts must pass first.
        assert!(!ctl.trigger_restart(151));
        assert!(!ctl.trigger_restart(199));
        assert!(ctl.trigger_restart(201));
    }

    #[test]
    fn luby_limits_scale_by_step() {
        let mut ctl = RestartCtl::new(ActiveRestart::Luby);

        assert!(!ctl.trigger_restart(100));
        assert!(ctl.trigger_restart(101));
        // limit = 101 + 1·100
        assert!(!ctl.trigger_restart(201));
        assert!(ctl.trigger_restart(202));
        // limit = 202 + 1·100
        assert!(ctl.trigger_restart(303));
        // limit = 303 + 2·100
        assert!(!ctl.trigger_restart(503));
        assert!(ctl.trigger_restart(504));
        assert_eq!(ctl.total_restarts(), 4);
    }

    #[test]
    fn blocking_is_glucose_only() {
        let mut ctl = RestartCtl::new(ActiveRestart::Luby);
        assert!(!ctl.block_restart(20_000));
    }
}
