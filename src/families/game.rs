//! GA1: how many of a given list of meetings take place within a slot set.

use super::*;
use crate::compiler::Compiler;
use crate::constraints::{ConstraintKind, Ga1};
use crate::error::{Error, Result};
use crate::model::*;
use crate::options::Ga1MinPenalty;

pub fn ga1(compiler: &mut Compiler, ga1: &Ga1) -> Result<()> {
    let kind = ConstraintKind::Ga1;
    let c = compiler.next(kind);
    if compiler.skips(ga1.strength) {
        // The minimum row would have taken a number of its own.
        if ga1.min > 0 {
            compiler.next(kind);
        }
        return Ok(());
    }
    if ga1.meetings.is_empty() {
        return Err(Error::Structure(format!("{} #{} lists no meetings", kind, c)));
    }

    let games = Expr::plus(
        ga1.meetings
            .iter()
            .map(|m| Expr::x(m.home(), m.away(), "s"))
            .collect(),
    );
    let lhs = Expr::sum_over(Binder::new(&["s"], SetExpr::ids(&ga1.slots)), games);

    let soft = penalty(ga1.strength).map(|p| (p, compiler.next_soft(kind)));
    let shared = soft.map(|(p, k)| {
        let v = Expr::var("ga1_viol", vec![Num::Int(k as i64)]);
        compiler.penalize(v.clone(), p);
        v
    });
    compiler.model.constraint(Constraint::new(
        constraint_name(kind.prefix(), c),
        Vec::new(),
        vec![Row::new(lhs.clone(), Sense::Le, at_most(int(ga1.max), shared.clone()))],
    ));

    if ga1.min > 0 {
        let c = compiler.next(kind);
        let viol = match (soft, compiler.options.ga1_min_penalty) {
            (None, _) => None,
            (Some(_), Ga1MinPenalty::Shared) => shared,
            (Some((p, k)), Ga1MinPenalty::Separate) => {
                let v = Expr::var("ga1_min_viol", vec![Num::Int(k as i64)]);
                compiler.penalize(v.clone(), p);
                Some(v)
            }
        };
        compiler.model.constraint(Constraint::new(
            constraint_name(kind.prefix(), c),
            Vec::new(),
            vec![Row::new(lhs, Sense::Ge, at_least(int(ga1.min), viol))],
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use crate::options::{Ga1MinPenalty, Options};
    use pretty_assertions::assert_eq;

    const SOFT_GA1: &str = r#"<GA1 max="2" meetings="0,1;2,3;" min="1" penalty="4" slots="1;0" type="SOFT"/>"#;

    #[test]
    fn hard_ga1_with_both_bounds() {
        let (model, _) = translate(
            4,
            6,
            r#"<GA1 max="1" meetings="0,1;1,0;" min="1" penalty="4" slots="3" type="HARD"/>
               <GA1 max="0" meetings="2,3;" min="0" penalty="4" slots="4" type="HARD"/>"#,
            &Options::default(),
        )
        .unwrap();
        assert_eq!(rendered(&model, "ga1_1"), "subto ga1_1:\n   sum <s> in {3}: (x[0,1,s] + x[1,0,s]) <= 1;");
        assert_eq!(rendered(&model, "ga1_2"), "subto ga1_2:\n   sum <s> in {3}: (x[0,1,s] + x[1,0,s]) >= 1;");
        assert_eq!(rendered(&model, "ga1_3"), "subto ga1_3:\n   sum <s> in {4}: x[2,3,s] <= 0;");
    }

    #[test]
    fn soft_minimum_shares_the_penalty_variable() {
        let (model, terms) = translate(4, 6, SOFT_GA1, &Options::default()).unwrap();
        assert_eq!(
            rendered(&model, "ga1_1"),
            "subto ga1_1:\n   sum <s> in {0, 1}: (x[0,1,s] + x[2,3,s]) <= 2 + ga1_viol[1];"
        );
        assert_eq!(
            rendered(&model, "ga1_2"),
            "subto ga1_2:\n   sum <s> in {0, 1}: (x[0,1,s] + x[2,3,s]) >= 1 - ga1_viol[1];"
        );
        assert_eq!(term_strings(&terms), vec!["ga1_viol[1] * 4"]);
    }

    #[test]
    fn soft_minimum_with_separate_variable() {
        let options = Options {
            ga1_min_penalty: Ga1MinPenalty::Separate,
            ..Options::default()
        };
        let (model, terms) = translate(4, 6, SOFT_GA1, &options).unwrap();
        assert!(rendered(&model, "ga1_2").ends_with(">= 1 - ga1_min_viol[1];"));
        assert_eq!(term_strings(&terms), vec!["ga1_viol[1] * 4", "ga1_min_viol[1] * 4"]);
    }

    #[test]
    fn suppressed_soft_minimum_uses_two_numbers() {
        let options = Options {
            soft: false,
            ..Options::default()
        };
        let constraints = format!(
            "{}{}",
            SOFT_GA1,
            r#"<GA1 max="0" meetings="2,3;" min="0" penalty="4" slots="4" type="HARD"/>"#
        );
        let (model, _) = translate(4, 6, &constraints, &options).unwrap();
        assert_eq!(model.constraints().map(|c| c.name.as_str()).collect::<Vec<_>>(), vec!["ga1_3"]);
    }
}
