/// Valid inequalities over odd-sized team subsets, added per slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OddSets {
    None,
    /// Subsets of exactly three teams.
    Three,
    /// Every odd subset size from 3 up to half the teams.
    All,
}

/// How the lower bound of a soft GA1 constraint is relaxed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ga1MinPenalty {
    /// Reuse the penalty variable of the upper bound row. Both rows cannot be violated at
    /// the same time as long as `min <= max`.
    Shared,
    /// Own `ga1_min_viol[k]` variable with its own objective term.
    Separate,
}

/// Upper bound on the penalty terms after the first `skip`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cutoff {
    pub value: i64,
    /// Number of leading penalty terms left out of the cutoff row.
    pub skip: usize,
}

impl Cutoff {
    pub const DEFAULT_SKIP: usize = 18;
}

/// Compilation modes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Emit soft constraints and the penalty objective.
    pub soft: bool,
    /// Second half of the season mirrors the first one.
    pub symmetric: bool,
    /// Maximize the number of scheduled matches instead of minimizing violation. Relaxes
    /// the structural equalities to `<=`.
    pub feasibility_objective: bool,
    pub odd_sets: OddSets,
    /// Fix the total number of scheduled matches to `slots * teams / 2`.
    pub fix_match_count: bool,
    pub objective_cutoff: Option<Cutoff>,
    pub ga1_min_penalty: Ga1MinPenalty,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            soft: true,
            symmetric: false,
            feasibility_objective: false,
            odd_sets: OddSets::None,
            fix_match_count: false,
            objective_cutoff: None,
            ga1_min_penalty: Ga1MinPenalty::Shared,
        }
    }
}
