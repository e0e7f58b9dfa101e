/*!
Configuration of a solver.

All knobs are fixed at construction; runtime strategy switches (focus/stable
mode, restart policy, decay) start from these values but live in the solver.
*/

use crate::generic::xorshift;

/// How far conflict-clause minimisation goes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CcMinMode {
    /// No minimisation.
    None,
    /// Drop a literal when every literal of its reason is seen or proven.
    Basic,
    /// As basic, recursively, with an abstract-level short-circuit.
    Deep,
}

/// Which restart controller starts active.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RestartMode {
    Glucose,
    Luby,
}

/// Which learnt-clause manager is used.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ReduceMode {
    /// A single learnt list, halved by activity/LBD order.
    Glucose,
    /// Three tiers (core / tier2 / local) with distinct eviction policies.
    Tiers,
}

/// The search regime requested at construction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchMode {
    /// Alternate between focus and stable phases ("target" search).
    Target,
    /// Focus only: glucose restarts, fast decay, no rephasing.
    Focus,
    /// Stable only: luby restarts, slow decay, target-phase rephasing.
    Stable,
}

/// How much phase saving applies on backtrack.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PhaseSaving {
    None,
    /// Save only assignments above the last decision level.
    Limited,
    Full,
}

/// The primary configuration structure.
#[derive(Clone)]
pub struct Config {
    /// The variable activity decay factor.
    pub var_decay: f64,

    /// The clause activity decay factor.
    pub clause_decay: f64,

    /// The frequency with which the decision heuristic tries to choose a
    /// random variable.
    pub random_var_freq: f64,

    /// Seed for the xorshift generator.
    pub random_seed: u32,

    /// Conflict clause minimisation mode.
    pub ccmin_mode: CcMinMode,

    /// Phase saving level.
    pub phase_saving: PhaseSaving,

    /// Use random polarities when branching.
    pub rnd_pol: bool,

    /// Initialise variable activities with a small random value.
    pub rnd_init_act: bool,

    /// Make the first descent before any conflict random.
    pub randomize_first_descent: bool,

    /// The fraction of wasted arena space tolerated before a garbage
    /// collection is triggered.
    pub garbage_frac: f64,

    /// Restart controller active at the start of the solve.
    pub restart_mode: RestartMode,

    /// Learnt-clause manager.
    pub reduce_mode: ReduceMode,

    /// Search regime.
    pub search_mode: SearchMode,

    /// Allow the local-search engine as a rephasing step.
    pub walk: bool,

    /// Run learnt-clause vivification between restart cycles.
    pub lcm: bool,

    /// Update stored LBDs from vivification results.
    pub lcm_update_lbd: bool,

    /// Save trail segments across long backjumps and replay them.
    pub save_trail: bool,

    /// Shrink reason clauses in place during analysis.
    pub self_subsumption: bool,

    /// Minimise learnt clauses by resolution against binary clauses.
    pub min_with_binary_resolution: bool,

    /// One-shot strategy retune at 100,000 conflicts.
    pub adapt_strategies: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            var_decay: 0.95,
            clause_decay: 0.999,
            random_var_freq: 0.0,
            random_seed: xorshift::DEFAULT_SEED,
            ccmin_mode: CcMinMode::Deep,
            phase_saving: PhaseSaving::Full,
            rnd_pol: false,
            rnd_init_act: false,
            randomize_first_descent: false,
            garbage_frac: 0.20,
            restart_mode: RestartMode::Glucose,
            reduce_mode: ReduceMode::Tiers,
            search_mode: SearchMode::Target,
            walk: true,
            lcm: true,
            lcm_update_lbd: true,
            save_trail: false,
            self_subsumption: false,
            min_with_binary_resolution: false,
            adapt_strategies: false,
        }
    }
}
