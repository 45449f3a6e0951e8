//! Parameters, sets, match variables and the structural constraints every double round
//! robin shares.

use crate::compiler::Compiler;
use crate::constraints::ConstraintKind;
use crate::model::*;
use crate::options::{Ga1MinPenalty, OddSets};
use log::*;

fn n(name: &str) -> Num {
    Num::name(name)
}

fn set(name: &str) -> SetExpr {
    SetExpr::name(name)
}

fn product(a: SetExpr, b: SetExpr) -> SetExpr {
    SetExpr::product(vec![a, b])
}

/// `T \ {t}`
fn others(t: &str) -> SetExpr {
    set("T").minus(SetExpr::single(t))
}

fn one() -> Expr {
    Expr::num(Num::Int(1))
}

fn both_ways(a: &str, b: &str, s: Num) -> Expr {
    Expr::plus(vec![Expr::x(a, b, s.clone()), Expr::x(b, a, s)])
}

pub fn emit(compiler: &mut Compiler) {
    let inst = compiler.instance;
    let options = compiler.options;
    // Structural rows are only upper bounds when the number of scheduled games is maximized.
    let exact = if options.feasibility_objective { Sense::Le } else { Sense::Eq };
    let model = &mut compiler.model;

    if let Some(name) = &inst.name {
        model.comment(format!("Name: {}", name));
    }
    model.comment(if inst.phased { "Phased" } else { "No phase" });
    model.comment(format!("Teams: {:?}", inst.teams));
    model.comment(format!("Slots: {:?}", inst.slots));
    model.blank();

    model.param("teams", Num::Int(inst.team_count() as i64));
    model.param("slots", Num::Int(inst.slot_count() as i64));
    model.blank();
    model.set("T", SetExpr::range(Num::Int(0), n("teams") - 1));
    model.set("S", SetExpr::range(Num::Int(0), n("slots") - 1));
    model.set("S0", SetExpr::range(Num::Int(1), n("slots") - 1));
    model.set("S1", SetExpr::range(Num::Int(0), n("slots") / 2 - 1));
    model.set("S2", SetExpr::range(n("slots") / 2, n("slots") - 1));
    model.set("SZ", SetExpr::range(Num::Int(0), n("slots") - 2));
    model.set(
        "M",
        SetExpr::builder(Binder::new(&["m", "n"], product(set("T"), set("T"))).with(Condition::ne("m", "n"))),
    );
    model.set(
        "MR",
        SetExpr::builder(Binder::new(&["m", "n"], product(set("T"), set("T"))).with(Condition::lt("m", "n"))),
    );
    model.blank();
    model.param("matches_per_slot", Num::card(set("T")) / 2);

    if options.soft {
        let mut declared = false;
        for kind in [ConstraintKind::Ca1, ConstraintKind::Ca2, ConstraintKind::Ga1].iter() {
            let soft = inst.soft_count_of(*kind);
            if soft == 0 {
                continue;
            }
            if !declared {
                model.blank();
                declared = true;
            }
            model.set(kind.tag(), SetExpr::range(Num::Int(1), Num::Int(soft as i64)));
            let viol = format!("{}_viol", kind.prefix());
            model.var(VarDecl::nonnegative(&viol, Some(VarIndex::Set(set(kind.tag())))));
            if *kind == ConstraintKind::Ga1 && options.ga1_min_penalty == Ga1MinPenalty::Separate {
                model.var(VarDecl::nonnegative("ga1_min_viol", Some(VarIndex::Set(set("GA1")))));
            }
        }
    }

    model.blank();
    model.var(VarDecl::binary("x", product(set("M"), set("S"))));
    if inst.has_breaks() {
        model.var(VarDecl::binary("bh", product(set("T"), set("S0"))));
        model.var(VarDecl::binary("ba", product(set("T"), set("S0"))));
    }

    model.blank();
    model.comment("Each match gets assigned to exactly one slot");
    model.constraint(Constraint::new(
        "c1",
        vec![Binder::new(&["m", "n"], set("M"))],
        vec![Row::new(
            Expr::sum_over(Binder::new(&["s"], set("S")), Expr::x("m", "n", "s")),
            exact,
            one(),
        )],
    ));

    model.blank();
    model.comment("At each slot, there are matches_per_slot matches");
    model.constraint(Constraint::new(
        "c2",
        vec![Binder::new(&["s"], set("S"))],
        vec![Row::new(
            Expr::sum_over(Binder::new(&["m", "n"], set("M")), Expr::x("m", "n", "s")),
            exact,
            Expr::num(n("matches_per_slot")),
        )],
    ));

    model.blank();
    model.comment("Each team plays once per slot");
    model.constraint(Constraint::new(
        "c3",
        vec![Binder::new(&["s"], set("S")), Binder::new(&["t"], set("T"))],
        vec![Row::new(
            Expr::plus(vec![
                Expr::sum_over(Binder::new(&["t", "n"], set("M")), Expr::x("t", "n", "s")),
                Expr::sum_over(Binder::new(&["m", "t"], set("M")), Expr::x("m", "t", "s")),
            ]),
            exact,
            one(),
        )],
    ));

    if options.fix_match_count {
        model.blank();
        model.comment("Fix the number of scheduled matches");
        model.constraint(Constraint::new(
            "f1",
            Vec::new(),
            vec![Row::new(
                Expr::sum_over(Binder::new(&["m", "n", "s"], product(set("M"), set("S"))), Expr::x("m", "n", "s")),
                Sense::Eq,
                Expr::num(n("slots") * n("teams") / 2),
            )],
        ));
    }

    match options.odd_sets {
        OddSets::None => {}
        OddSets::Three => odd_sets(model, 3, "c6"),
        OddSets::All => {
            for k in (3..=inst.team_count() / 2).step_by(2) {
                odd_sets(model, k, &format!("cos{}", k));
            }
        }
    }

    if inst.has_breaks() {
        let home = |prev: bool| {
            let s = if prev { n("s") - 1 } else { n("s") };
            Expr::sum_over(Binder::new(&["a"], others("t")), Expr::x("t", "a", s))
        };
        let away = |prev: bool| {
            let s = if prev { n("s") - 1 } else { n("s") };
            Expr::sum_over(Binder::new(&["h"], others("t")), Expr::x("h", "t", s))
        };
        model.blank();
        model.comment("Count breaks");
        model.constraint(Constraint::new(
            "br_count",
            vec![Binder::new(&["t"], set("T")), Binder::new(&["s"], set("S0"))],
            vec![
                Row::new(
                    Expr::plus(vec![home(true), home(false)]).minus(one()),
                    Sense::Le,
                    Expr::var("bh", vec![n("t"), n("s")]),
                ),
                Row::new(
                    Expr::plus(vec![away(true), away(false)]).minus(one()),
                    Sense::Le,
                    Expr::var("ba", vec![n("t"), n("s")]),
                ),
            ],
        ));
    }

    if inst.phased && !options.symmetric {
        model.blank();
        model.comment("Each pairing once per half season");
        model.constraint(Constraint::new(
            "c4",
            vec![Binder::new(&["m", "n"], set("MR"))],
            vec![Row::new(
                Expr::sum_over(Binder::new(&["s"], set("S1")), both_ways("m", "n", n("s"))),
                exact,
                one(),
            )],
        ));
    }

    if inst.has_fa2() {
        let upper = if inst.phased {
            (n("s") + 1).min(Num::card(set("S")) / 2)
        } else {
            n("s") + 1
        };
        model.blank();
        model.comment("Home games played up to and including slot s");
        model.var(VarDecl {
            name: "hg".to_string(),
            index: Some(VarIndex::Binder(Binder::new(&["t", "s"], product(set("T"), set("S"))))),
            domain: VarDomain::Integer,
            lower: Some(Num::Int(0)),
            upper: Some(upper),
        });
        model.constraint(Constraint::new(
            "hg_count",
            vec![Binder::new(&["t"], set("T")), Binder::new(&["s"], set("S"))],
            vec![Row::new(
                Expr::sum_over(
                    Binder::new(&["a", "p"], product(others("t"), SetExpr::range(Num::Int(0), n("s")))),
                    Expr::x("t", "a", "p"),
                ),
                Sense::Eq,
                Expr::var("hg", vec![n("t"), n("s")]),
            )],
        ));
    }

    if options.symmetric {
        model.blank();
        model.comment("Second half mirrors the first");
        model.constraint(Constraint::new(
            "c5",
            vec![
                Binder::new(&["m", "n"], set("M")),
                Binder::new(&["s"], SetExpr::range(Num::Int(0), ((n("slots") - 1) / 2).floor())),
            ],
            vec![Row::new(
                Expr::x("m", "n", "s"),
                Sense::Eq,
                Expr::x("n", "m", n("s") + n("slots") / 2),
            )],
        ));
    }

    info!("Base model: {} x variables", inst.x_variable_count());
}

/// Every odd set of `k` teams must send at least one match across its border in each slot.
fn odd_sets(model: &mut Model, k: usize, name: &str) {
    let family = format!("K{}", k);
    let index = format!("I{}", k);
    let member = format!("{}[i]", family);
    debug!("Adding odd set inequalities {} over subsets of size {}", name, k);

    model.blank();
    model.comment(format!("Odd set inequalities for subsets of {} teams", k));
    model.indexed_set(&family, SetExpr::Subsets(Box::new(set("T")), k));
    model.set(&index, SetExpr::IndexSet(family.clone()));
    model.constraint(Constraint::new(
        name,
        vec![Binder::new(&["s"], set("S")), Binder::new(&["i"], set(&index))],
        vec![Row::new(
            Expr::sum_over(
                Binder::new(&["m", "n"], product(set(&member), set("T").minus(set(&member)))),
                both_ways("m", "n", n("s")),
            ),
            Sense::Ge,
            one(),
        )],
    ));
}
