//! Zimpl text output for the model syntax tree.

use crate::model::*;
use itertools::Itertools;
use std::fmt::{self, Display, Formatter, Write};

const INDENT: &str = "   ";

fn num_precedence(n: &Num) -> u8 {
    match n {
        Num::Add(..) | Num::Sub(..) => 1,
        Num::Mul(..) | Num::Div(..) => 2,
        _ => 3,
    }
}

fn num_operand(f: &mut Formatter<'_>, n: &Num, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({})", n)
    } else {
        write!(f, "{}", n)
    }
}

fn binary(f: &mut Formatter<'_>, a: &Num, op: &str, b: &Num, prec: u8, left_assoc_only: bool) -> fmt::Result {
    num_operand(f, a, num_precedence(a) < prec)?;
    write!(f, " {} ", op)?;
    let pb = num_precedence(b);
    num_operand(f, b, pb < prec || (left_assoc_only && pb == prec))
}

impl Display for Num {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Num::Int(v) => write!(f, "{}", v),
            Num::Name(n) => f.write_str(n),
            Num::Add(a, b) => binary(f, a, "+", b, 1, false),
            Num::Sub(a, b) => binary(f, a, "-", b, 1, true),
            Num::Mul(a, b) => binary(f, a, "*", b, 2, false),
            Num::Div(a, b) => binary(f, a, "/", b, 2, true),
            Num::Floor(a) => write!(f, "floor({})", a),
            Num::Min(a, b) => write!(f, "min({}, {})", a, b),
            Num::Card(s) => write!(f, "card({})", s),
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let op = match self.cmp {
            Cmp::Ne => "!=",
            Cmp::Lt => "<",
        };
        write!(f, "{} {} {}", self.lhs, op, self.rhs)
    }
}

impl Display for SetExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SetExpr::Name(n) => f.write_str(n),
            SetExpr::Range(a, b) => write!(f, "{{ {} .. {} }}", a, b),
            SetExpr::List(items) => write!(f, "{{{}}}", items.iter().join(", ")),
            SetExpr::Product(sets) => {
                let mut parts = sets.iter().map(|s| match s {
                    SetExpr::Minus(..) | SetExpr::Product(..) => format!("({})", s),
                    _ => s.to_string(),
                });
                f.write_str(&parts.join(" * "))
            }
            SetExpr::Minus(a, b) => write!(f, "{} \\ {}", a, b),
            SetExpr::Builder(b) => write!(f, "{{ {} }}", b),
            SetExpr::Subsets(s, k) => write!(f, "subsets({}, {})", s, k),
            SetExpr::IndexSet(n) => write!(f, "indexset({})", n),
        }
    }
}

impl Display for Binder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> in {}", self.vars.iter().join(","), self.domain)?;
        if let Some(c) = &self.condition {
            write!(f, " with {}", c)?;
        }
        Ok(())
    }
}

impl Display for VarRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.index.is_empty() {
            write!(f, "[{}]", self.index.iter().join(","))?;
        }
        Ok(())
    }
}

// Sums and differences need parentheses when used as a factor or as a `sum` body.
fn expr_operand(e: &Expr) -> String {
    match e {
        Expr::Sum(..) | Expr::Diff(..) => format!("({})", e),
        _ => e.to_string(),
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(n) => write!(f, "{}", n),
            Expr::Var(v) => write!(f, "{}", v),
            Expr::Sum(terms) => f.write_str(&terms.iter().join(" + ")),
            Expr::Diff(a, b) => write!(f, "{} - {}", a, expr_operand(b)),
            Expr::Scale(n, e) => {
                num_operand(f, n, num_precedence(n) < 3)?;
                write!(f, " * {}", expr_operand(e))
            }
            Expr::Weighted(e, w) => match e.as_ref() {
                Expr::SumOver(binder, body) => {
                    write!(f, "sum {}: {}", binder, Expr::Weighted(body.clone(), *w))
                }
                _ => write!(f, "{} * {}", expr_operand(e), w),
            },
            Expr::SumOver(binder, body) => write!(f, "sum {}: {}", binder, expr_operand(body)),
            Expr::Abs(e) => write!(f, "vabs({})", e),
        }
    }
}

impl Display for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let op = match self.sense {
            Sense::Le => "<=",
            Sense::Ge => ">=",
            Sense::Eq => "==",
        };
        write!(f, "{} {} {}", self.lhs, op, self.rhs)
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "subto {}:", self.name)?;
        let mut depth = 1;
        for binder in &self.foralls {
            writeln!(f, "{}forall {}:", INDENT.repeat(depth), binder)?;
            depth += 1;
        }
        let indent = INDENT.repeat(depth);
        for (i, row) in self.rows.iter().enumerate() {
            if i == 0 {
                write!(f, "{}{}", indent, row)?;
            } else {
                write!(f, "\n{}and {}", indent, row)?;
            }
        }
        f.write_char(';')
    }
}

impl Display for VarDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "var {}", self.name)?;
        match &self.index {
            Some(VarIndex::Set(s)) => write!(f, "[{}]", s)?,
            Some(VarIndex::Binder(b)) => write!(f, "[{}]", b)?,
            None => {}
        }
        match self.domain {
            VarDomain::Binary => f.write_str(" binary")?,
            VarDomain::Integer => f.write_str(" integer")?,
            VarDomain::Real => {}
        }
        if let Some(lb) = &self.lower {
            write!(f, " >= {}", lb)?;
        }
        if let Some(ub) = &self.upper {
            write!(f, " <= {}", ub)?;
        }
        f.write_char(';')
    }
}

impl Display for Objective {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sense = match self.sense {
            ObjSense::Minimize => "minimize",
            ObjSense::Maximize => "maximize",
        };
        let sep = format!("\n{}+ ", INDENT);
        write!(f, "{} {}: {};", sense, self.name, self.terms.iter().join(&sep))
    }
}

impl Display for Item {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Item::Comment(text) => {
                let mut lines = text.lines().map(|l| format!("# {}", l).trim_end().to_string());
                f.write_str(&lines.join("\n"))
            }
            Item::Blank => Ok(()),
            Item::Param(p) => write!(f, "param {} := {};", p.name, p.value),
            Item::Set(s) => {
                let brackets = if s.indexed { "[]" } else { "" };
                write!(f, "set {}{} := {};", s.name, brackets, s.value)
            }
            Item::Var(v) => write!(f, "{}", v),
            Item::Constraint(c) => write!(f, "{}", c),
            Item::Objective(o) => write!(f, "{}", o),
        }
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for item in self.items() {
            writeln!(f, "{}", item)?;
        }
        Ok(())
    }
}
