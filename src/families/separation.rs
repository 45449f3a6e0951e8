//! SE1: at least `min` slots between the two mutual games of every pair of listed teams.

use super::*;
use crate::compiler::Compiler;
use crate::constraints::{ConstraintKind, Se1};
use crate::error::Result;
use crate::model::*;

pub fn se1(compiler: &mut Compiler, se1: &Se1) -> Result<()> {
    let kind = ConstraintKind::Se1;
    let c = compiler.next(kind);
    if compiler.skips(se1.strength) {
        return Ok(());
    }

    let pairs = Binder::new(&["m", "n"], pairs_of(&se1.teams)).with(Condition::lt("m", "n"));
    let name = viol_name(kind.prefix(), c);
    let viol = penalty(se1.strength).map(|p| {
        compiler
            .model
            .var(VarDecl::nonnegative(&name, Some(VarIndex::Binder(pairs.clone()))));
        let v = Expr::var(&name, vec![sym("m"), sym("n")]);
        compiler.penalize(Expr::sum_over(pairs.clone(), v.clone()), p);
        v
    });

    // The slot of a game is recovered as `sum s * x`; shifted by one so slot 0 counts.
    let position = |a: &str, b: &str| Expr::x(a, b, "s").scaled(sym("s") + 1);
    let distance = Expr::sum_over(
        Binder::new(&["s"], SetExpr::name("S")),
        position("m", "n").minus(position("n", "m")),
    )
    .abs();

    compiler.model.constraint(Constraint::new(
        constraint_name(kind.prefix(), c),
        vec![pairs],
        vec![Row::new(distance, Sense::Ge, at_least(Num::Int(i64::from(se1.min) + 1), viol))],
    ));
    Ok(())
}
