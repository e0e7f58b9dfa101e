/*!
Miscellaneous items related to [logging](log).

Calls to the log macros are made throughout the library, with a target per
subsystem so output can be narrowed to relevant parts. No log implementation
is provided by the library; the CLI installs one.
*/

/// Targets to be used within a [log]! macro.
pub mod targets {
    pub const PROPAGATION: &str = "propagation";
    pub const ANALYSIS: &str = "analysis";
    pub const REDUCTION: &str = "reduction";
    pub const CLAUSE_DB: &str = "clause_db";
    pub const BACKJUMP: &str = "backjump";
    pub const RESTART: &str = "restart";
    pub const REPHASE: &str = "rephase";
    pub const WALK: &str = "walk";
    pub const VIVIFY: &str = "vivify";
    pub const EXCHANGE: &str = "exchange";
    pub const SEARCH: &str = "search";
}
