use crate::base;
use crate::constraints::{ConstraintKind, ConstraintSpec, Strength};
use crate::error::Result;
use crate::families::{breaks, capacity, fairness, game, separation};
use crate::instance::Instance;
use crate::model::{Expr, Model};
use crate::objective;
use crate::options::Options;
use log::*;
use std::collections::BTreeMap;

/// State threaded through every emitter: the model under construction, the per-kind
/// numbering and the penalty terms registered so far.
pub struct Compiler<'a> {
    pub instance: &'a Instance,
    pub options: &'a Options,
    pub model: Model,
    counters: BTreeMap<ConstraintKind, usize>,
    soft_counters: BTreeMap<ConstraintKind, usize>,
    /// `None` when soft constraints are suppressed.
    objective: Option<Vec<Expr>>,
}

impl<'a> Compiler<'a> {
    pub fn new(instance: &'a Instance, options: &'a Options) -> Compiler<'a> {
        Compiler {
            instance,
            options,
            model: Model::new(),
            counters: BTreeMap::new(),
            soft_counters: BTreeMap::new(),
            objective: if options.soft { Some(Vec::new()) } else { None },
        }
    }

    /// Advances the occurrence counter of `kind` and returns the new value.
    pub fn next(&mut self, kind: ConstraintKind) -> usize {
        let c = self.counters.entry(kind).or_insert(0);
        *c += 1;
        *c
    }

    /// Advances the counter indexing the shared penalty array of `kind`.
    pub fn next_soft(&mut self, kind: ConstraintKind) -> usize {
        let c = self.soft_counters.entry(kind).or_insert(0);
        *c += 1;
        *c
    }

    pub fn count(&self, kind: ConstraintKind) -> usize {
        self.counters.get(&kind).copied().unwrap_or(0)
    }

    /// A soft constraint is dropped entirely when there is no objective to charge it to.
    pub fn skips(&self, strength: Strength) -> bool {
        strength.is_soft() && self.objective.is_none()
    }

    pub fn penalize(&mut self, term: Expr, penalty: u32) {
        if let Some(terms) = &mut self.objective {
            terms.push(term.weighted(i64::from(penalty)));
        }
    }

    pub(crate) fn take_penalty_terms(&mut self) -> Option<Vec<Expr>> {
        self.objective.take()
    }

    pub(crate) fn translate(&mut self, spec: &ConstraintSpec) -> Result<()> {
        debug!("{}", spec);
        self.model.blank();
        self.model.comment(spec.to_string());
        match spec {
            ConstraintSpec::Ca1(c) => capacity::ca1(self, c),
            ConstraintSpec::Ca2(c) => capacity::ca2(self, c),
            ConstraintSpec::Ca3(c) => capacity::ca3(self, c),
            ConstraintSpec::Ca4(c) => capacity::ca4(self, c),
            ConstraintSpec::Ga1(c) => game::ga1(self, c),
            ConstraintSpec::Se1(c) => separation::se1(self, c),
            ConstraintSpec::Br1(c) => breaks::br1(self, c),
            ConstraintSpec::Br2(c) => breaks::br2(self, c),
            ConstraintSpec::Fa2(c) => fairness::fa2(self, c),
        }
    }
}

/// Compiles an instance into a Zimpl model. Either the whole model is produced or an
/// error is returned.
pub fn compile(instance: &Instance, options: &Options) -> Result<Model> {
    info!(
        "Compiling {} teams, {} slots, {} constraints",
        instance.team_count(),
        instance.slot_count(),
        instance.constraints.len()
    );
    let mut compiler = Compiler::new(instance, options);
    base::emit(&mut compiler);
    for spec in &instance.constraints {
        compiler.translate(spec)?;
    }
    for kind in ConstraintKind::ALL.iter() {
        if compiler.count(*kind) > 0 {
            debug!("{}: {} numbered", kind, compiler.count(*kind));
        }
    }
    objective::assemble(&mut compiler);
    Ok(compiler.model)
}
