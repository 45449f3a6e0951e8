use crate::compiler::Compiler;
use crate::model::*;
use log::*;

/// `maximize games: sum <m,n,s> in M * S: x[m,n,s];`
fn games() -> Objective {
    Objective {
        sense: ObjSense::Maximize,
        name: "games".to_string(),
        terms: vec![Expr::sum_over(
            Binder::new(&["m", "n", "s"], SetExpr::product(vec![SetExpr::name("M"), SetExpr::name("S")])),
            Expr::x("m", "n", "s"),
        )],
    }
}

/// Closes the model with its objective and, if requested, the cutoff row over the
/// registered penalty terms.
pub fn assemble(compiler: &mut Compiler) {
    let options = compiler.options;
    let terms = compiler.take_penalty_terms();

    if options.feasibility_objective {
        if terms.as_ref().map_or(false, |t| !t.is_empty()) {
            info!("Penalty terms are dropped in favour of the feasibility objective");
        }
        compiler.model.blank();
        compiler.model.objective(games());
        return;
    }

    let terms = match terms {
        Some(terms) => terms,
        None => return,
    };
    info!("Objective has {} penalty terms", terms.len());

    if let Some(cutoff) = options.objective_cutoff {
        let tail = terms.iter().skip(cutoff.skip).cloned().collect::<Vec<_>>();
        if tail.is_empty() {
            warn!(
                "Objective cutoff ignored, only {} penalty terms and {} are skipped",
                terms.len(),
                cutoff.skip
            );
        } else {
            compiler.model.blank();
            compiler.model.constraint(Constraint::new(
                "oc1",
                Vec::new(),
                vec![Row::new(Expr::plus(tail), Sense::Le, Expr::num(Num::Int(cutoff.value)))],
            ));
        }
    }

    if !terms.is_empty() {
        compiler.model.blank();
        compiler.model.objective(Objective {
            sense: ObjSense::Minimize,
            name: "violation".to_string(),
            terms,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;
    use crate::options::{Cutoff, Options};
    use crate::test_utils::instance_xml;
    use pretty_assertions::assert_eq;

    fn assembled(options: &Options, penalties: &[(&str, u32)]) -> Model {
        let inst = Instance::parse(&instance_xml(4, 6, false, "")).unwrap();
        let mut compiler = Compiler::new(&inst, options);
        for (name, p) in penalties {
            compiler.penalize(Expr::scalar(name), *p);
        }
        assemble(&mut compiler);
        compiler.model
    }

    #[test]
    fn minimize_in_registration_order() {
        let model = assembled(&Options::default(), &[("b", 2), ("a", 1)]);
        assert_eq!(
            model.objective_statement().unwrap().to_string(),
            "minimize violation: b * 2\n   + a * 1;"
        );
        assert!(model.constraint_named("oc1").is_none());
    }

    #[test]
    fn no_terms_no_objective() {
        assert!(assembled(&Options::default(), &[]).objective_statement().is_none());
        let options = Options {
            soft: false,
            ..Options::default()
        };
        assert!(assembled(&options, &[]).objective_statement().is_none());
    }

    #[test]
    fn feasibility_objective_replaces_penalties() {
        let options = Options {
            feasibility_objective: true,
            ..Options::default()
        };
        let model = assembled(&options, &[("a", 1)]);
        assert_eq!(
            model.objective_statement().unwrap().to_string(),
            "maximize games: sum <m,n,s> in M * S: x[m,n,s];"
        );
        let options = Options {
            soft: false,
            ..options
        };
        assert_eq!(
            assembled(&options, &[]).objective_statement().unwrap().to_string(),
            "maximize games: sum <m,n,s> in M * S: x[m,n,s];"
        );
    }

    #[test]
    fn cutoff_skips_leading_terms() {
        let options = Options {
            objective_cutoff: Some(Cutoff { value: 40, skip: 1 }),
            ..Options::default()
        };
        let model = assembled(&options, &[("a", 1), ("b", 2), ("c", 3)]);
        assert_eq!(
            model.constraint_named("oc1").unwrap().to_string(),
            "subto oc1:\n   b * 2 + c * 3 <= 40;"
        );
        assert_eq!(model.objective_statement().unwrap().terms.len(), 3);

        let options = Options {
            objective_cutoff: Some(Cutoff {
                value: 40,
                skip: Cutoff::DEFAULT_SKIP,
            }),
            ..Options::default()
        };
        let model = assembled(&options, &[("a", 1), ("b", 2)]);
        assert!(model.constraint_named("oc1").is_none());
        assert!(model.objective_statement().is_some());
    }
}
