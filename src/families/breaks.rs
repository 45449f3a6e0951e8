//! Break constraints on the `bh`/`ba` indicators set up by the base model.

use super::*;
use crate::compiler::Compiler;
use crate::constraints::{Br1, Br2, ConstraintKind, Side};
use crate::error::{Error, Result};
use crate::model::*;
use itertools::Itertools;
use log::*;

fn breaks_at(side: Side, t: &str, s: &str) -> Expr {
    sided(
        side,
        Expr::var("bh", vec![sym(t), sym(s)]),
        Expr::var("ba", vec![sym(t), sym(s)]),
    )
}

/// Scalar penalty variable, declared right before the constraint using it.
fn scalar_viol(compiler: &mut Compiler, name: &str, penalty: u32) -> Expr {
    compiler.model.var(VarDecl::nonnegative(name, None));
    compiler.penalize(Expr::scalar(name), penalty);
    Expr::scalar(name)
}

/// BR1: at most `intp` breaks per listed team within the slots.
pub fn br1(compiler: &mut Compiler, br1: &Br1) -> Result<()> {
    let kind = ConstraintKind::Br1;
    let c = compiler.next(kind);
    if compiler.skips(br1.strength) {
        return Ok(());
    }

    // Nobody can have a break in the first slot.
    let slots = br1.slots.iter().copied().filter(|s| *s != 0).collect::<Vec<_>>();
    if slots.is_empty() {
        debug!("{}_{} only covers slot 0, nothing to emit", kind.prefix(), c);
        return Ok(());
    }

    let viol = penalty(br1.strength).map(|p| scalar_viol(compiler, &viol_name(kind.prefix(), c), p));
    compiler.model.constraint(Constraint::new(
        constraint_name(kind.prefix(), c),
        vec![Binder::new(&["t"], SetExpr::ids(&br1.teams))],
        vec![Row::new(
            Expr::sum_over(Binder::new(&["s"], SetExpr::ids(&slots)), breaks_at(br1.mode2, "t", "s")),
            Sense::Le,
            at_most(int(br1.intp), viol),
        )],
    ));
    Ok(())
}

/// BR2: at most `intp` breaks in total over the listed teams and a block of consecutive
/// slots. A break is charged to its second slot, so the first slot of the block is left out.
pub fn br2(compiler: &mut Compiler, br2: &Br2) -> Result<()> {
    let kind = ConstraintKind::Br2;
    let c = compiler.next(kind);
    let slots = br2.slots.iter().copied().sorted().dedup().collect::<Vec<_>>();
    if slots.windows(2).any(|w| w[1] != w[0] + 1) {
        return Err(Error::Structure(format!("{} slots {:?} are not consecutive", kind, slots)));
    }
    if compiler.skips(br2.strength) {
        return Ok(());
    }

    let counted = &slots[slots.len().min(1)..];
    if counted.is_empty() {
        debug!("{}_{} covers a single slot, nothing to emit", kind.prefix(), c);
        return Ok(());
    }

    let viol = penalty(br2.strength).map(|p| scalar_viol(compiler, &viol_name(kind.prefix(), c), p));
    let domain = SetExpr::product(vec![SetExpr::ids(&br2.teams), SetExpr::ids(counted)]);
    compiler.model.constraint(Constraint::new(
        constraint_name(kind.prefix(), c),
        Vec::new(),
        vec![Row::new(
            Expr::sum_over(Binder::new(&["t", "s"], domain), breaks_at(Side::Both, "t", "s")),
            Sense::Le,
            at_most(int(br2.intp), viol),
        )],
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use crate::error::Error;
    use crate::options::Options;
    use pretty_assertions::assert_eq;

    #[test]
    fn br1_in_first_slot_emits_nothing() {
        let (model, terms) = translate(
            4,
            6,
            r#"<BR1 intp="0" mode1="LEQ" mode2="HA" penalty="5" slots="0" teams="0" type="SOFT"/>"#,
            &Options::default(),
        )
        .unwrap();
        assert_eq!(model.constraints().count(), 0);
        assert_eq!(model.variables().count(), 0);
        assert!(terms.unwrap().is_empty());
    }

    #[test]
    fn br1_drops_slot_zero() {
        let (model, terms) = translate(
            4,
            6,
            r#"<BR1 intp="1" mode1="LEQ" mode2="H" penalty="5" slots="3;0;2" teams="2" type="SOFT"/>"#,
            &Options::default(),
        )
        .unwrap();
        assert_eq!(model.variable_named("br1_1_viol").unwrap().to_string(), "var br1_1_viol >= 0;");
        assert_eq!(
            rendered(&model, "br1_1"),
            "subto br1_1:\n   forall <t> in {2}:\n      sum <s> in {2, 3}: bh[t,s] <= 1 + br1_1_viol;"
        );
        assert_eq!(term_strings(&terms), vec!["br1_1_viol * 5"]);
    }

    #[test]
    fn br2_skips_first_slot_of_block() {
        let (model, _) = translate(
            4,
            6,
            r#"<BR2 homeMode="HA" intp="2" mode2="LEQ" penalty="1" slots="3;1;2" teams="1;0" type="HARD"/>"#,
            &Options::default(),
        )
        .unwrap();
        assert_eq!(
            rendered(&model, "br2_1"),
            "subto br2_1:\n   sum <t,s> in {0, 1} * {2, 3}: (bh[t,s] + ba[t,s]) <= 2;"
        );
    }

    #[test]
    fn br2_with_gap_is_rejected() {
        let err = translate(
            4,
            6,
            r#"<BR2 homeMode="HA" intp="2" mode2="LEQ" penalty="1" slots="0;1;3" teams="0" type="HARD"/>"#,
            &Options::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Structure(_)));
    }
}
