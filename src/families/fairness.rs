//! FA2: the difference in home games played so far between any two listed teams stays
//! within `intp` at each of the slots.

use super::*;
use crate::compiler::Compiler;
use crate::constraints::{ConstraintKind, Fa2};
use crate::error::Result;
use crate::model::*;

pub fn fa2(compiler: &mut Compiler, fa2: &Fa2) -> Result<()> {
    let kind = ConstraintKind::Fa2;
    let c = compiler.next(kind);
    if compiler.skips(fa2.strength) {
        return Ok(());
    }

    let pair_set = format!("FA2_{}", c);
    compiler.model.set(
        &pair_set,
        SetExpr::builder(Binder::new(&["m", "n"], pairs_of(&fa2.teams)).with(Condition::lt("m", "n"))),
    );

    let name = viol_name(kind.prefix(), c);
    let viol = penalty(fa2.strength).map(|p| {
        compiler
            .model
            .var(VarDecl::nonnegative(&name, Some(VarIndex::Set(SetExpr::name(&pair_set)))));
        let v = Expr::var(&name, vec![sym("m"), sym("n")]);
        compiler.penalize(
            Expr::sum_over(Binder::new(&["m", "n"], SetExpr::name(&pair_set)), v.clone()),
            p,
        );
        v
    });

    let hg = |t: &str| Expr::var("hg", vec![sym(t), sym("s")]);
    compiler.model.constraint(Constraint::new(
        constraint_name(kind.prefix(), c),
        vec![
            Binder::new(&["m", "n"], SetExpr::name(&pair_set)),
            Binder::new(&["s"], SetExpr::ids(&fa2.slots)),
        ],
        vec![
            Row::new(hg("m").minus(hg("n")), Sense::Le, at_most(int(fa2.intp), viol.clone())),
            Row::new(hg("n").minus(hg("m")), Sense::Le, at_most(int(fa2.intp), viol)),
        ],
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use crate::options::Options;
    use pretty_assertions::assert_eq;

    #[test]
    fn soft_fairness() {
        let (model, terms) = translate(
            4,
            6,
            r#"<FA2 intp="2" mode="H" penalty="10" slots="1;0" teams="1;0;2" type="SOFT"/>"#,
            &Options::default(),
        )
        .unwrap();
        let out = model.to_string();
        assert!(out.contains("set FA2_1 := { <m,n> in {0, 1, 2} * {0, 1, 2} with m < n };\n"));
        assert!(out.contains("var fa2_1_viol[FA2_1] >= 0;\n"));
        assert_eq!(
            rendered(&model, "fa2_1"),
            "subto fa2_1:\n   forall <m,n> in FA2_1:\n      forall <s> in {0, 1}:\n         \
             hg[m,s] - hg[n,s] <= 2 + fa2_1_viol[m,n]\n         \
             and hg[n,s] - hg[m,s] <= 2 + fa2_1_viol[m,n];"
        );
        assert_eq!(term_strings(&terms), vec!["sum <m,n> in FA2_1: fa2_1_viol[m,n] * 10"]);
    }

    #[test]
    fn hard_fairness_has_no_penalty_variable() {
        let (model, terms) = translate(
            4,
            6,
            r#"<FA2 intp="1" mode="H" penalty="10" slots="3" teams="0;1" type="HARD"/>"#,
            &Options::default(),
        )
        .unwrap();
        assert_eq!(model.variables().count(), 0);
        assert!(rendered(&model, "fa2_1").ends_with("and hg[n,s] - hg[m,s] <= 1;"));
        assert!(terms.unwrap().is_empty());
    }
}
