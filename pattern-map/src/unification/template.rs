//! Templates are the symmetric counterpart of patterns: rather than
//! extracting values for variables, they populate a target tree with
//! values.
//!
//! Like patterns, templates are compiled once.  Subtrees that do not
//! mention any (unshadowed) variable are shared as is with every
//! instance.
use super::scope::{binder, Binder};
use super::Variables;
use crate::ground::{Term, Type, TypeHierarchy};

#[derive(Clone, Debug)]
enum Slot {
    Constant(Term),
    /// Replaced by the `index`th value, or left as `variable` when
    /// that value is missing.
    Hole { variable: Term, index: usize },
    Link { ty: Type, outgoing: Vec<Slot> },
}

impl Slot {
    fn compile(
        term: &Term,
        variables: &Variables,
        hierarchy: &TypeHierarchy,
        shadowed: &mut Vec<Term>,
    ) -> Self {
        if !shadowed.contains(term) {
            if let Some(index) = variables.index_of(term) {
                return Slot::Hole {
                    variable: term.clone(),
                    index,
                };
            }
        }

        if !term.is_link() {
            return Slot::Constant(term.clone());
        }

        let depth = shadowed.len();
        match binder(term, hierarchy) {
            Binder::Opaque => return Slot::Constant(term.clone()),
            Binder::Declared(vars) => shadowed.extend(vars.varseq().iter().cloned()),
            Binder::Transparent => {}
        }

        let outgoing: Vec<Slot> = term
            .outgoing()
            .iter()
            .map(|child| Slot::compile(child, variables, hierarchy, shadowed))
            .collect();
        shadowed.truncate(depth);

        if outgoing.iter().all(|slot| matches!(slot, Slot::Constant(_))) {
            Slot::Constant(term.clone())
        } else {
            Slot::Link {
                ty: term.ty().clone(),
                outgoing,
            }
        }
    }

    fn instantiate(&self, values: &[Option<Term>]) -> Term {
        match self {
            Slot::Constant(term) => term.clone(),
            Slot::Hole { variable, index } => match values.get(*index) {
                Some(Some(value)) => value.clone(),
                _ => variable.clone(),
            },
            Slot::Link { ty, outgoing } => Term::link(
                ty.clone(),
                outgoing.iter().map(|slot| slot.instantiate(values)).collect(),
            ),
        }
    }
}

/// A compiled rewrite target.
#[derive(Clone, Debug)]
pub struct Template {
    target: Term,
    root: Slot,
}

impl Template {
    /// Compiles `target`, with holes for each free occurrence of
    /// `variables`.
    #[must_use]
    pub fn new(target: &Term, variables: &Variables, hierarchy: &TypeHierarchy) -> Self {
        Self {
            target: target.clone(),
            root: Slot::compile(target, variables, hierarchy, &mut Vec::new()),
        }
    }

    #[must_use]
    pub fn target(&self) -> &Term {
        &self.target
    }

    /// Substitutes `values` for the variables, positionally.  No type
    /// checking happens here: values are expected to come from a
    /// grounding, which already checked them.
    #[must_use]
    pub fn instantiate(&self, values: &[Option<Term>]) -> Term {
        self.root.instantiate(values)
    }
}

#[cfg(test)]
use crate::ground::types::LAMBDA_LINK;

#[test]
fn test_instantiate_happy_path() {
    let x = Term::variable("$x");
    let y = Term::variable("$y");
    let vars = Variables::new(vec![x.clone(), y.clone()]).expect("ok");
    let target = Term::link("g", vec![y.clone(), Term::link("h", vec![x.clone(), x.clone()])]);
    let template = Template::new(&target, &vars, &TypeHierarchy::standard());

    assert_eq!(template.target(), &target);
    assert_eq!(
        template.instantiate(&[Some(Term::number(1)), Some(Term::number(2))]),
        Term::link(
            "g",
            vec![
                Term::number(2),
                Term::link("h", vec![Term::number(1), Term::number(1)])
            ]
        )
    );
}

#[test]
fn test_missing_values_leave_variables() {
    let x = Term::variable("$x");
    let y = Term::variable("$y");
    let vars = Variables::new(vec![x.clone(), y.clone()]).expect("ok");
    let target = Term::link("g", vec![x.clone(), y.clone()]);
    let template = Template::new(&target, &vars, &TypeHierarchy::standard());

    assert_eq!(
        template.instantiate(&[None, Some(Term::number(2))]),
        Term::link("g", vec![x.clone(), Term::number(2)])
    );
}

#[test]
fn test_constant_subtrees_are_shared() {
    let x = Term::variable("$x");
    let vars = Variables::new(vec![x.clone()]).expect("ok");
    let constant = Term::link("k", vec![Term::number(9)]);
    let target = Term::link("g", vec![x.clone(), constant.clone()]);
    let template = Template::new(&target, &vars, &TypeHierarchy::standard());

    let instance = template.instantiate(&[Some(Term::number(1))]);
    assert!(instance.outgoing()[1].same_allocation(&constant));

    // Without any hole, the target itself is returned.
    let closed = Template::new(&constant, &vars, &TypeHierarchy::standard());
    assert!(closed.instantiate(&[Some(Term::number(1))]).same_allocation(&constant));
}

#[test]
fn test_nested_scopes_shadow() {
    let x = Term::variable("$x");
    let y = Term::variable("$y");
    let vars = Variables::new(vec![x.clone(), y.clone()]).expect("ok");

    // (g $x (Lambda $x (h $x $y)))
    let inner = Term::link(LAMBDA_LINK, vec![x.clone(), Term::link("h", vec![x.clone(), y.clone()])]);
    let target = Term::link("g", vec![x.clone(), inner]);
    let template = Template::new(&target, &vars, &TypeHierarchy::standard());

    assert_eq!(
        template.instantiate(&[Some(Term::number(1)), Some(Term::number(2))]),
        Term::link(
            "g",
            vec![
                Term::number(1),
                Term::link(
                    LAMBDA_LINK,
                    vec![x.clone(), Term::link("h", vec![x.clone(), Term::number(2)])]
                )
            ]
        )
    );
}

#[test]
fn test_substitute_unchecked() {
    let x = Term::variable("$x");
    let vars = Variables::new(vec![x.clone()]).expect("ok");

    assert_eq!(
        vars.substitute_unchecked(
            &Term::set(vec![x.clone(), Term::number(1)]),
            &[Some(Term::number(0))],
            &TypeHierarchy::standard()
        ),
        Term::set(vec![Term::number(1), Term::number(0)])
    );
}
