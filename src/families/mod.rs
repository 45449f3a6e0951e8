//! One translator per constraint kind. Each gets its typed record and the shared
//! [`Compiler`](crate::compiler::Compiler) state.

pub mod breaks;
pub mod capacity;
pub mod fairness;
pub mod game;
pub mod separation;

use crate::constraints::{Side, Strength};
use crate::model::{Expr, Num, SetExpr};

pub(crate) fn sym(name: &str) -> Num {
    Num::name(name)
}

pub(crate) fn int(v: u32) -> Num {
    Num::Int(i64::from(v))
}

pub(crate) fn constraint_name(prefix: &str, count: usize) -> String {
    format!("{}_{}", prefix, count)
}

/// Name of the per-constraint penalty variable, e.g. `ca3_2_viol`.
pub(crate) fn viol_name(prefix: &str, count: usize) -> String {
    format!("{}_{}_viol", prefix, count)
}

/// `(home + away)` terms selected by `side`.
pub(crate) fn sided(side: Side, home: Expr, away: Expr) -> Expr {
    let mut terms = Vec::new();
    if side.counts_home() {
        terms.push(home);
    }
    if side.counts_away() {
        terms.push(away);
    }
    Expr::plus(terms)
}

/// `bound`, or `bound + viol` for soft constraints.
pub(crate) fn at_most(bound: Num, viol: Option<Expr>) -> Expr {
    match viol {
        None => Expr::num(bound),
        Some(v) => Expr::plus(vec![Expr::num(bound), v]),
    }
}

/// `bound`, or `bound - viol` for soft constraints.
pub(crate) fn at_least(bound: Num, viol: Option<Expr>) -> Expr {
    match viol {
        None => Expr::num(bound),
        Some(v) => Expr::num(bound).minus(v),
    }
}

pub(crate) fn penalty(strength: Strength) -> Option<u32> {
    match strength {
        Strength::Hard => None,
        Strength::Soft(p) => Some(p),
    }
}

/// `{teams} * {teams}`, the domain of the unordered pairs of a team group.
pub(crate) fn pairs_of(teams: &[i64]) -> SetExpr {
    SetExpr::product(vec![SetExpr::ids(teams), SetExpr::ids(teams)])
}
