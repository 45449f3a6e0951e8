//! Capacity constraints CA1 to CA4: upper bounds on the number of home/away games of a
//! team group over a set of slots. Only `min = 0` is supported.

use super::*;
use crate::compiler::Compiler;
use crate::constraints::{Ca1, Ca2, Ca3, Ca4, ConstraintKind, Scope, Side};
use crate::error::{Error, Result};
use crate::model::*;

fn check_min(kind: ConstraintKind, min: u32) -> Result<()> {
    if min != 0 {
        return Err(Error::unsupported(kind, "min", min));
    }
    Ok(())
}

/// Penalty variable from one of the shared `ca1_viol`/`ca2_viol` arrays.
fn shared_viol(compiler: &mut Compiler, kind: ConstraintKind, penalty: u32) -> Expr {
    let k = compiler.next_soft(kind);
    let v = Expr::var(&format!("{}_viol", kind.prefix()), vec![Num::Int(k as i64)]);
    compiler.penalize(v.clone(), penalty);
    v
}

/// At most `max` home (or away) games of each listed team within the slots.
pub fn ca1(compiler: &mut Compiler, ca1: &Ca1) -> Result<()> {
    let kind = ConstraintKind::Ca1;
    let c = compiler.next(kind);
    check_min(kind, ca1.min)?;
    if compiler.skips(ca1.strength) {
        return Ok(());
    }

    let x = match ca1.mode {
        Side::Away => Expr::x("n", "t", "s"),
        _ => Expr::x("t", "n", "s"),
    };
    let lhs = Expr::sum_over(
        Binder::new(&["n"], SetExpr::name("T").minus(SetExpr::single("t"))),
        Expr::sum_over(Binder::new(&["s"], SetExpr::ids(&ca1.slots)), x),
    );
    let viol = penalty(ca1.strength).map(|p| shared_viol(compiler, kind, p));

    compiler.model.constraint(Constraint::new(
        constraint_name(kind.prefix(), c),
        vec![Binder::new(&["t"], SetExpr::ids(&ca1.teams))],
        vec![Row::new(lhs, Sense::Le, at_most(int(ca1.max), viol))],
    ));
    Ok(())
}

/// At most `max` games of each team of `teams1` against `teams2`, summed over the slots.
pub fn ca2(compiler: &mut Compiler, ca2: &Ca2) -> Result<()> {
    let kind = ConstraintKind::Ca2;
    let c = compiler.next(kind);
    check_min(kind, ca2.min)?;
    if compiler.skips(ca2.strength) {
        return Ok(());
    }

    let domain = SetExpr::product(vec![SetExpr::ids(&ca2.slots), SetExpr::ids(&ca2.teams2)]);
    let lhs = Expr::sum_over(
        Binder::new(&["s", "m"], domain).with(Condition::ne("m", "t")),
        sided(ca2.mode1, Expr::x("t", "m", "s"), Expr::x("m", "t", "s")),
    );
    let viol = penalty(ca2.strength).map(|p| shared_viol(compiler, kind, p));

    compiler.model.constraint(Constraint::new(
        constraint_name(kind.prefix(), c),
        vec![Binder::new(&["t"], SetExpr::ids(&ca2.teams1))],
        vec![Row::new(lhs, Sense::Le, at_most(int(ca2.max), viol))],
    ));
    Ok(())
}

/// Sliding window of `intp` consecutive slots ending in `s`, for every `s` where the
/// window fits.
pub fn ca3(compiler: &mut Compiler, ca3: &Ca3) -> Result<()> {
    let kind = ConstraintKind::Ca3;
    let c = compiler.next(kind);
    check_min(kind, ca3.min)?;
    if ca3.intp < 2 {
        return Err(Error::unsupported(kind, "intp", ca3.intp));
    }
    if compiler.skips(ca3.strength) {
        return Ok(());
    }

    let window_ends = SetExpr::name("S").minus(SetExpr::range(Num::Int(0), int(ca3.intp - 2)));
    let mut games = Vec::new();
    for i in 0..i64::from(ca3.intp) {
        let s = if i == 0 { sym("s") } else { sym("s") - i };
        games.push(sided(ca3.mode1, Expr::x("t", "m", s.clone()), Expr::x("m", "t", s)));
    }
    let lhs = Expr::sum_over(
        Binder::new(&["m"], SetExpr::ids(&ca3.teams2).minus(SetExpr::single("t"))),
        Expr::plus(games),
    );

    let viol = match penalty(ca3.strength) {
        None => None,
        Some(p) => {
            let name = viol_name(kind.prefix(), c);
            compiler
                .model
                .var(VarDecl::nonnegative(&name, Some(VarIndex::Set(window_ends.clone()))));
            compiler.penalize(
                Expr::sum_over(
                    Binder::new(&["s"], window_ends.clone()),
                    Expr::var(&name, vec![sym("s")]),
                ),
                p,
            );
            Some(Expr::var(&name, vec![sym("s")]))
        }
    };

    compiler.model.constraint(Constraint::new(
        constraint_name(kind.prefix(), c),
        vec![
            Binder::new(&["t"], SetExpr::ids(&ca3.teams1)),
            Binder::new(&["s"], window_ends),
        ],
        vec![Row::new(lhs, Sense::Le, at_most(int(ca3.max), viol))],
    ));
    Ok(())
}

/// Games between `teams1` and `teams2`, bounded either over all slots together or per slot.
pub fn ca4(compiler: &mut Compiler, ca4: &Ca4) -> Result<()> {
    let kind = ConstraintKind::Ca4;
    let c = compiler.next(kind);
    check_min(kind, ca4.min)?;
    if compiler.skips(ca4.strength) {
        return Ok(());
    }

    let slots = SetExpr::ids(&ca4.slots);
    let teams = vec![SetExpr::ids(&ca4.teams1), SetExpr::ids(&ca4.teams2)];
    let games = sided(ca4.mode1, Expr::x("m", "n", "s"), Expr::x("n", "m", "s"));
    let name = viol_name(kind.prefix(), c);

    let (foralls, lhs, viol) = match ca4.mode2 {
        Scope::Global => {
            let mut domain = teams;
            domain.push(slots);
            let lhs = Expr::sum_over(
                Binder::new(&["m", "n", "s"], SetExpr::product(domain)).with(Condition::ne("m", "n")),
                games,
            );
            let viol = penalty(ca4.strength).map(|p| {
                compiler.model.var(VarDecl::nonnegative(&name, None));
                compiler.penalize(Expr::scalar(&name), p);
                Expr::scalar(&name)
            });
            (Vec::new(), lhs, viol)
        }
        Scope::Every => {
            let lhs = Expr::sum_over(
                Binder::new(&["m", "n"], SetExpr::product(teams)).with(Condition::ne("m", "n")),
                games,
            );
            let viol = penalty(ca4.strength).map(|p| {
                compiler
                    .model
                    .var(VarDecl::nonnegative(&name, Some(VarIndex::Set(slots.clone()))));
                compiler.penalize(
                    Expr::sum_over(Binder::new(&["s"], slots.clone()), Expr::var(&name, vec![sym("s")])),
                    p,
                );
                Expr::var(&name, vec![sym("s")])
            });
            (vec![Binder::new(&["s"], slots)], lhs, viol)
        }
    };

    compiler.model.constraint(Constraint::new(
        constraint_name(kind.prefix(), c),
        foralls,
        vec![Row::new(lhs, Sense::Le, at_most(int(ca4.max), viol))],
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use crate::constraints::ConstraintKind;
    use crate::error::Error;
    use crate::options::Options;
    use pretty_assertions::assert_eq;

    #[test]
    fn hard_ca1_is_a_plain_bound() {
        let (model, terms) = translate(
            4,
            6,
            r#"<CA1 max="1" min="0" mode="H" penalty="5" slots="2;0;1" teams="0" type="HARD"/>"#,
            &Options::default(),
        )
        .unwrap();
        assert_eq!(
            rendered(&model, "ca1_1"),
            "subto ca1_1:\n   forall <t> in {0}:\n      sum <n> in T \\ {t}: sum <s> in {0, 1, 2}: x[t,n,s] <= 1;"
        );
        assert!(terms.unwrap().is_empty());
        assert_eq!(model.variables().count(), 0);
    }

    #[test]
    fn soft_ca1_uses_shared_array() {
        let (model, terms) = translate(
            4,
            6,
            r#"<CA1 max="1" min="0" mode="A" penalty="5" slots="0;1;2" teams="0;1" type="SOFT"/>
               <CA1 max="0" min="0" mode="H" penalty="2" slots="3" teams="2" type="HARD"/>
               <CA1 max="0" min="0" mode="H" penalty="3" slots="4" teams="3" type="SOFT"/>"#,
            &Options::default(),
        )
        .unwrap();
        assert_eq!(
            rendered(&model, "ca1_1"),
            "subto ca1_1:\n   forall <t> in {0, 1}:\n      sum <n> in T \\ {t}: sum <s> in {0, 1, 2}: x[n,t,s] <= 1 + ca1_viol[1];"
        );
        assert!(rendered(&model, "ca1_3").ends_with("<= 0 + ca1_viol[2];"));
        assert_eq!(term_strings(&terms), vec!["ca1_viol[1] * 5", "ca1_viol[2] * 3"]);
    }

    #[test]
    fn nonzero_min_is_rejected() {
        let err = translate(
            4,
            6,
            r#"<CA1 max="2" min="1" mode="H" penalty="5" slots="0" teams="0" type="HARD"/>"#,
            &Options::default(),
        )
        .unwrap_err();
        match err {
            Error::UnsupportedAttribute { kind, attribute, .. } => {
                assert_eq!(kind, ConstraintKind::Ca1);
                assert_eq!(attribute, "min");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn ca2_excludes_the_team_itself() {
        let (model, _) = translate(
            4,
            6,
            r#"<CA2 max="1" min="0" mode1="HA" mode2="GLOBAL" penalty="1" slots="1;0" teams1="0;1" teams2="1;2;3" type="HARD"/>"#,
            &Options::default(),
        )
        .unwrap();
        assert_eq!(
            rendered(&model, "ca2_1"),
            "subto ca2_1:\n   forall <t> in {0, 1}:\n      sum <s,m> in {0, 1} * {1, 2, 3} with m != t: (x[t,m,s] + x[m,t,s]) <= 1;"
        );
    }

    #[test]
    fn soft_ca3_window() {
        let (model, terms) = translate(
            4,
            6,
            r#"<CA3 intp="3" max="2" min="0" mode1="A" mode2="SLOTS" penalty="3" teams1="0" teams2="2;1" type="SOFT"/>"#,
            &Options::default(),
        )
        .unwrap();
        assert_eq!(
            model.variable_named("ca3_1_viol").unwrap().to_string(),
            "var ca3_1_viol[S \\ { 0 .. 1 }] >= 0;"
        );
        assert_eq!(
            rendered(&model, "ca3_1"),
            "subto ca3_1:\n   forall <t> in {0}:\n      forall <s> in S \\ { 0 .. 1 }:\n         \
             sum <m> in {1, 2} \\ {t}: (x[m,t,s] + x[m,t,s - 1] + x[m,t,s - 2]) <= 2 + ca3_1_viol[s];"
        );
        assert_eq!(term_strings(&terms), vec!["sum <s> in S \\ { 0 .. 1 }: ca3_1_viol[s] * 3"]);
    }

    #[test]
    fn ca3_needs_a_window_of_two() {
        let err = translate(
            4,
            6,
            r#"<CA3 intp="1" max="0" min="0" mode1="H" mode2="SLOTS" penalty="3" teams1="0" teams2="1" type="HARD"/>"#,
            &Options::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedAttribute {
                kind: ConstraintKind::Ca3,
                attribute: "intp",
                ..
            }
        ));
    }

    #[test]
    fn ca4_global_and_every() {
        let (model, terms) = translate(
            4,
            6,
            r#"<CA4 max="1" min="0" mode1="H" mode2="GLOBAL" penalty="1" slots="3" teams1="0" teams2="2;1" type="HARD"/>
               <CA4 max="3" min="0" mode1="HA" mode2="EVERY" penalty="2" slots="0;1" teams1="0;1" teams2="2" type="SOFT"/>"#,
            &Options::default(),
        )
        .unwrap();
        assert_eq!(
            rendered(&model, "ca4_1"),
            "subto ca4_1:\n   sum <m,n,s> in {0} * {1, 2} * {3} with m != n: x[m,n,s] <= 1;"
        );
        assert_eq!(model.variable_named("ca4_2_viol").unwrap().to_string(), "var ca4_2_viol[{0, 1}] >= 0;");
        assert_eq!(
            rendered(&model, "ca4_2"),
            "subto ca4_2:\n   forall <s> in {0, 1}:\n      sum <m,n> in {0, 1} * {2} with m != n: (x[m,n,s] + x[n,m,s]) <= 3 + ca4_2_viol[s];"
        );
        assert_eq!(term_strings(&terms), vec!["sum <s> in {0, 1}: ca4_2_viol[s] * 2"]);
    }

    #[test]
    fn suppressed_soft_still_advances_the_counter() {
        let options = Options {
            soft: false,
            ..Options::default()
        };
        let (model, terms) = translate(
            4,
            6,
            r#"<CA4 max="1" min="0" mode1="H" mode2="GLOBAL" penalty="1" slots="3" teams1="0" teams2="1" type="SOFT"/>
               <CA4 max="1" min="0" mode1="H" mode2="GLOBAL" penalty="1" slots="3" teams1="0" teams2="1" type="HARD"/>"#,
            &options,
        )
        .unwrap();
        assert!(terms.is_none());
        assert!(model.constraint_named("ca4_1").is_none());
        assert!(model.constraint_named("ca4_2").is_some());
        assert_eq!(model.variables().count(), 0);
    }
}
