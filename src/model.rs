//! Syntax tree of the generated Zimpl model.
//!
//! The compiler only ever appends to a [`Model`]; turning it into text is done by the
//! `Display` impls in `render`.

use itertools::Itertools;
use std::ops;

/// Integer-valued expression: constants, parameters, bound index symbols and arithmetic
/// between them.
#[derive(Clone, Debug, PartialEq)]
pub enum Num {
    Int(i64),
    Name(String),
    Add(Box<Num>, Box<Num>),
    Sub(Box<Num>, Box<Num>),
    Mul(Box<Num>, Box<Num>),
    Div(Box<Num>, Box<Num>),
    Floor(Box<Num>),
    Min(Box<Num>, Box<Num>),
    Card(Box<SetExpr>),
}

impl Num {
    pub fn name(name: &str) -> Num {
        Num::Name(name.to_string())
    }

    pub fn floor(self) -> Num {
        Num::Floor(Box::new(self))
    }

    pub fn min(self, other: Num) -> Num {
        Num::Min(Box::new(self), Box::new(other))
    }

    pub fn card(set: SetExpr) -> Num {
        Num::Card(Box::new(set))
    }
}

impl From<i64> for Num {
    fn from(v: i64) -> Num {
        Num::Int(v)
    }
}

impl From<&str> for Num {
    fn from(name: &str) -> Num {
        Num::name(name)
    }
}

macro_rules! num_op {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl ops::$trait<Num> for Num {
            type Output = Num;
            fn $method(self, rhs: Num) -> Num {
                Num::$variant(Box::new(self), Box::new(rhs))
            }
        }

        impl ops::$trait<i64> for Num {
            type Output = Num;
            fn $method(self, rhs: i64) -> Num {
                Num::$variant(Box::new(self), Box::new(Num::Int(rhs)))
            }
        }
    };
}

num_op!(Add, add, Add);
num_op!(Sub, sub, Sub);
num_op!(Mul, mul, Mul);
num_op!(Div, div, Div);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cmp {
    Ne,
    Lt,
}

/// `with` filter of a set builder or index binder.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub lhs: Num,
    pub cmp: Cmp,
    pub rhs: Num,
}

impl Condition {
    pub fn ne(lhs: impl Into<Num>, rhs: impl Into<Num>) -> Condition {
        Condition {
            lhs: lhs.into(),
            cmp: Cmp::Ne,
            rhs: rhs.into(),
        }
    }

    pub fn lt(lhs: impl Into<Num>, rhs: impl Into<Num>) -> Condition {
        Condition {
            lhs: lhs.into(),
            cmp: Cmp::Lt,
            rhs: rhs.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SetExpr {
    Name(String),
    Range(Num, Num),
    List(Vec<Num>),
    Product(Vec<SetExpr>),
    Minus(Box<SetExpr>, Box<SetExpr>),
    Builder(Box<Binder>),
    Subsets(Box<SetExpr>, usize),
    IndexSet(String),
}

impl SetExpr {
    pub fn name(name: &str) -> SetExpr {
        SetExpr::Name(name.to_string())
    }

    pub fn range(from: impl Into<Num>, to: impl Into<Num>) -> SetExpr {
        SetExpr::Range(from.into(), to.into())
    }

    /// Literal set of ids, sorted and without duplicates.
    pub fn ids<'a>(ids: impl IntoIterator<Item = &'a i64>) -> SetExpr {
        SetExpr::List(ids.into_iter().copied().sorted().dedup().map(Num::Int).collect())
    }

    /// `{ t }` for a bound symbol.
    pub fn single(sym: &str) -> SetExpr {
        SetExpr::List(vec![Num::name(sym)])
    }

    pub fn product(sets: Vec<SetExpr>) -> SetExpr {
        SetExpr::Product(sets)
    }

    pub fn minus(self, other: SetExpr) -> SetExpr {
        SetExpr::Minus(Box::new(self), Box::new(other))
    }

    pub fn builder(binder: Binder) -> SetExpr {
        SetExpr::Builder(Box::new(binder))
    }
}

/// `<m,n> in D with cond`, used by `forall`, `sum`, set builders and indexed variables.
#[derive(Clone, Debug, PartialEq)]
pub struct Binder {
    pub vars: Vec<String>,
    pub domain: SetExpr,
    pub condition: Option<Condition>,
}

impl Binder {
    pub fn new(vars: &[&str], domain: SetExpr) -> Binder {
        Binder {
            vars: vars.iter().map(|v| v.to_string()).collect(),
            domain,
            condition: None,
        }
    }

    pub fn with(mut self, condition: Condition) -> Binder {
        self.condition = Some(condition);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarRef {
    pub name: String,
    pub index: Vec<Num>,
}

/// Linear expression over model variables.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Num(Num),
    Var(VarRef),
    Sum(Vec<Expr>),
    Diff(Box<Expr>, Box<Expr>),
    Scale(Num, Box<Expr>),
    /// Objective term; the weight is written after the expression.
    Weighted(Box<Expr>, i64),
    SumOver(Box<Binder>, Box<Expr>),
    Abs(Box<Expr>),
}

impl Expr {
    pub fn var(name: &str, index: Vec<Num>) -> Expr {
        Expr::Var(VarRef {
            name: name.to_string(),
            index,
        })
    }

    pub fn scalar(name: &str) -> Expr {
        Expr::var(name, Vec::new())
    }

    /// The match variable `x[m,n,s]`.
    pub fn x(m: impl Into<Num>, n: impl Into<Num>, s: impl Into<Num>) -> Expr {
        Expr::var("x", vec![m.into(), n.into(), s.into()])
    }

    pub fn num(n: impl Into<Num>) -> Expr {
        Expr::Num(n.into())
    }

    pub fn sum_over(binder: Binder, body: Expr) -> Expr {
        Expr::SumOver(Box::new(binder), Box::new(body))
    }

    /// Flattened `a + b`; a single term is returned as is.
    pub fn plus(terms: Vec<Expr>) -> Expr {
        let mut flat = Vec::with_capacity(terms.len());
        for term in terms {
            match term {
                Expr::Sum(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            return flat.pop().unwrap_or(Expr::Sum(Vec::new()));
        }
        Expr::Sum(flat)
    }

    pub fn minus(self, other: Expr) -> Expr {
        Expr::Diff(Box::new(self), Box::new(other))
    }

    pub fn scaled(self, by: impl Into<Num>) -> Expr {
        Expr::Scale(by.into(), Box::new(self))
    }

    pub fn weighted(self, weight: i64) -> Expr {
        Expr::Weighted(Box::new(self), weight)
    }

    pub fn abs(self) -> Expr {
        Expr::Abs(Box::new(self))
    }

    /// Names of all variables referenced by this expression.
    pub fn var_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_var_names(&mut names);
        names
    }

    fn collect_var_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Num(_) => {}
            Expr::Var(v) => out.push(&v.name),
            Expr::Sum(terms) => terms.iter().for_each(|t| t.collect_var_names(out)),
            Expr::Diff(a, b) => {
                a.collect_var_names(out);
                b.collect_var_names(out);
            }
            Expr::Scale(_, e) | Expr::Weighted(e, _) | Expr::SumOver(_, e) | Expr::Abs(e) => e.collect_var_names(out),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub lhs: Expr,
    pub sense: Sense,
    pub rhs: Expr,
}

impl Row {
    pub fn new(lhs: Expr, sense: Sense, rhs: Expr) -> Row {
        Row { lhs, sense, rhs }
    }
}

/// A named `subto` block: nested `forall` binders around one or more rows joined by `and`.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub foralls: Vec<Binder>,
    pub rows: Vec<Row>,
}

impl Constraint {
    pub fn new(name: impl Into<String>, foralls: Vec<Binder>, rows: Vec<Row>) -> Constraint {
        Constraint {
            name: name.into(),
            foralls,
            rows,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarDomain {
    Binary,
    Integer,
    Real,
}

#[derive(Clone, Debug, PartialEq)]
pub enum VarIndex {
    Set(SetExpr),
    Binder(Binder),
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub index: Option<VarIndex>,
    pub domain: VarDomain,
    pub lower: Option<Num>,
    pub upper: Option<Num>,
}

impl VarDecl {
    pub fn binary(name: &str, index: SetExpr) -> VarDecl {
        VarDecl {
            name: name.to_string(),
            index: Some(VarIndex::Set(index)),
            domain: VarDomain::Binary,
            lower: None,
            upper: None,
        }
    }

    /// Nonnegative continuous variable, the shape of every penalty variable.
    pub fn nonnegative(name: &str, index: Option<VarIndex>) -> VarDecl {
        VarDecl {
            name: name.to_string(),
            index,
            domain: VarDomain::Real,
            lower: Some(Num::Int(0)),
            upper: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub value: Num,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SetDecl {
    pub name: String,
    /// Declared as `name[]`, a family of sets such as `subsets(T, 3)`.
    pub indexed: bool,
    pub value: SetExpr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjSense {
    Minimize,
    Maximize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Objective {
    pub sense: ObjSense,
    pub name: String,
    pub terms: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Comment(String),
    Blank,
    Param(ParamDecl),
    Set(SetDecl),
    Var(VarDecl),
    Constraint(Constraint),
    Objective(Objective),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    items: Vec<Item>,
}

impl Model {
    pub fn new() -> Model {
        Model::default()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn comment(&mut self, text: impl Into<String>) {
        self.items.push(Item::Comment(text.into()));
    }

    pub fn blank(&mut self) {
        self.items.push(Item::Blank);
    }

    pub fn param(&mut self, name: &str, value: impl Into<Num>) {
        self.items.push(Item::Param(ParamDecl {
            name: name.to_string(),
            value: value.into(),
        }));
    }

    pub fn set(&mut self, name: &str, value: SetExpr) {
        self.items.push(Item::Set(SetDecl {
            name: name.to_string(),
            indexed: false,
            value,
        }));
    }

    pub fn indexed_set(&mut self, name: &str, value: SetExpr) {
        self.items.push(Item::Set(SetDecl {
            name: name.to_string(),
            indexed: true,
            value,
        }));
    }

    pub fn var(&mut self, decl: VarDecl) {
        self.items.push(Item::Var(decl));
    }

    pub fn constraint(&mut self, constraint: Constraint) {
        self.items.push(Item::Constraint(constraint));
    }

    pub fn objective(&mut self, objective: Objective) {
        self.items.push(Item::Objective(objective));
    }

    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.items.iter().filter_map(|i| match i {
            Item::Constraint(c) => Some(c),
            _ => None,
        })
    }

    pub fn variables(&self) -> impl Iterator<Item = &VarDecl> {
        self.items.iter().filter_map(|i| match i {
            Item::Var(v) => Some(v),
            _ => None,
        })
    }

    pub fn constraint_named(&self, name: &str) -> Option<&Constraint> {
        self.constraints().find(|c| c.name == name)
    }

    pub fn variable_named(&self, name: &str) -> Option<&VarDecl> {
        self.variables().find(|v| v.name == name)
    }

    pub fn objective_statement(&self) -> Option<&Objective> {
        self.items.iter().find_map(|i| match i {
            Item::Objective(o) => Some(o),
            _ => None,
        })
    }
}
