//! A scope declares an ordered list of variables, each with an
//! optional type restriction.  The order matters: it is the order of
//! values in result tuples, and the order in which substitution
//! consumes values.
use super::template::Template;
use crate::error::{Error, Result};
use crate::ground::types::{TYPED_VARIABLE_LINK, TYPE_CHOICE, TYPE_NODE, VARIABLE_LIST, VARIABLE_NODE};
use crate::ground::{Term, Type, TypeHierarchy};
use std::collections::{BTreeSet, HashMap};

/// A `TypePredicate` decides whether a (declared) variable may be
/// bound to a ground candidate.  Closures of the right shape are
/// predicates.
pub trait TypePredicate: Send + Sync {
    fn accepts(&self, variable: &Term, candidate: &Term) -> bool;
}

impl<F> TypePredicate for F
where
    F: Fn(&Term, &Term) -> bool + Send + Sync,
{
    #[inline]
    fn accepts(&self, variable: &Term, candidate: &Term) -> bool {
        self(variable, candidate)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Variables {
    varseq: Vec<Term>,
    /// Map from variable to its index in `varseq`.
    varset: HashMap<Term, usize>,
    /// Parallel to `varseq`; `None` means "accepts anything".
    restrictions: Vec<Option<BTreeSet<Type>>>,
}

impl Variables {
    /// Returns untyped variables for `varseq`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a term is not a `VariableNode`, or is repeated.
    pub fn new<I: IntoIterator<Item = Term>>(varseq: I) -> Result<Self> {
        let mut ret = Self::default();

        for var in varseq {
            ret.push(var, None)?;
        }

        Ok(ret)
    }

    /// Returns true iff `term` has the shape of a variable
    /// declaration: a `VariableNode`, a `TypedVariableLink` or a
    /// `VariableList`.
    #[must_use]
    pub fn is_declaration(term: &Term) -> bool {
        let ty = term.ty();

        if term.is_link() {
            *ty == TYPED_VARIABLE_LINK || *ty == VARIABLE_LIST
        } else {
            *ty == VARIABLE_NODE
        }
    }

    /// Parses a variable declaration.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `decl` is not a well-formed declaration, or if
    /// it declares the same variable twice.
    pub fn from_declaration(decl: &Term) -> Result<Self> {
        let mut ret = Self::default();

        if decl.is_link() && *decl.ty() == VARIABLE_LIST {
            for item in decl.outgoing() {
                ret.push_declaration(item)?;
            }
        } else {
            ret.push_declaration(decl)?;
        }

        Ok(ret)
    }

    /// Builds variables from a list we already know to be made of
    /// distinct `VariableNode`s.
    pub(crate) fn from_distinct(varseq: Vec<Term>) -> Self {
        let varset = varseq
            .iter()
            .enumerate()
            .map(|(index, var)| (var.clone(), index))
            .collect();
        let restrictions = vec![None; varseq.len()];

        Self {
            varseq,
            varset,
            restrictions,
        }
    }

    fn push_declaration(&mut self, decl: &Term) -> Result<()> {
        if decl.is_variable() {
            return self.push(decl.clone(), None);
        }

        if !decl.is_link() || *decl.ty() != TYPED_VARIABLE_LINK {
            return Err(Error::VariableDeclaration(format!(
                "expecting a VariableNode or a TypedVariableLink, got {}",
                decl
            )));
        }

        match decl.outgoing() {
            [var, restriction] if var.is_variable() => {
                let types = parse_restriction(restriction)?;
                self.push(var.clone(), Some(types))
            }
            _ => Err(Error::VariableDeclaration(format!(
                "expecting TypedVariableLink(VariableNode, type), got {}",
                decl
            ))),
        }
    }

    fn push(&mut self, var: Term, restriction: Option<BTreeSet<Type>>) -> Result<()> {
        if !var.is_variable() {
            return Err(Error::VariableDeclaration(format!(
                "expecting a VariableNode, got {}",
                var
            )));
        }

        if self.varset.contains_key(&var) {
            return Err(Error::DuplicateVariable(var.to_string()));
        }

        self.varset.insert(var.clone(), self.varseq.len());
        self.varseq.push(var);
        self.restrictions.push(restriction);
        Ok(())
    }

    /// Returns the declared variables, in declaration order.
    #[inline]
    #[must_use]
    pub fn varseq(&self) -> &[Term] {
        &self.varseq
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.varseq.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.varseq.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, var: &Term) -> bool {
        self.varset.contains_key(var)
    }

    /// Returns the position of `var` in `varseq`.
    #[inline]
    #[must_use]
    pub fn index_of(&self, var: &Term) -> Option<usize> {
        self.varset.get(var).copied()
    }

    /// Returns the set of types `var` is restricted to, or `None` if
    /// it is unrestricted (or not declared).
    #[must_use]
    pub fn restriction(&self, var: &Term) -> Option<&BTreeSet<Type>> {
        self.index_of(var)
            .and_then(|index| self.restrictions[index].as_ref())
    }

    /// Returns true iff `var` is declared and may be bound to
    /// `candidate`: an unrestricted variable accepts anything, a
    /// restricted one only ground terms whose type is exactly one of
    /// its types.
    #[must_use]
    pub fn is_type(&self, var: &Term, candidate: &Term) -> bool {
        match self.index_of(var) {
            None => false,
            Some(index) => match &self.restrictions[index] {
                None => true,
                Some(types) => types.contains(candidate.ty()),
            },
        }
    }

    /// Substitutes `values` (positionally, in `varseq` order) for the
    /// variables in `target`, without any type check.  Missing values
    /// leave the variable in place.
    #[must_use]
    pub fn substitute_unchecked(
        &self,
        target: &Term,
        values: &[Option<Term>],
        hierarchy: &TypeHierarchy,
    ) -> Term {
        Template::new(target, self, hierarchy).instantiate(values)
    }
}

impl TypePredicate for Variables {
    #[inline]
    fn accepts(&self, variable: &Term, candidate: &Term) -> bool {
        self.is_type(variable, candidate)
    }
}

/// Parses a `TypeNode`, or a `TypeChoice` of `TypeNode`s.
fn parse_restriction(restriction: &Term) -> Result<BTreeSet<Type>> {
    let type_name = |term: &Term| -> Result<Type> {
        match term.name() {
            Some(name) if *term.ty() == TYPE_NODE => Ok(Type::new(name)),
            _ => Err(Error::VariableDeclaration(format!(
                "expecting a TypeNode, got {}",
                term
            ))),
        }
    };

    if restriction.is_link() && *restriction.ty() == TYPE_CHOICE {
        restriction.outgoing().iter().map(type_name).collect()
    } else {
        Ok(std::iter::once(type_name(restriction)?).collect())
    }
}

#[cfg(test)]
fn typed(var: &Term, types: &[&str]) -> Term {
    let restriction = if types.len() == 1 {
        Term::node(TYPE_NODE, types[0])
    } else {
        Term::link(
            TYPE_CHOICE,
            types.iter().map(|name| Term::node(TYPE_NODE, *name)).collect(),
        )
    };

    Term::link(TYPED_VARIABLE_LINK, vec![var.clone(), restriction])
}

#[test]
fn test_new_untyped() {
    let x = Term::variable("$x");
    let y = Term::variable("$y");
    let vars = Variables::new(vec![x.clone(), y.clone()]).expect("ok");

    assert_eq!(vars.varseq(), &[x.clone(), y.clone()]);
    assert_eq!(vars.index_of(&y), Some(1));
    assert!(vars.contains(&x));
    assert!(!vars.contains(&Term::variable("$z")));
    assert!(vars.is_type(&x, &Term::number(1)));
    assert!(vars.is_type(&x, &Term::list(vec![])));
    assert!(!vars.is_type(&Term::variable("$z"), &Term::number(1)));
}

#[test]
fn test_new_rejects_bad_variables() {
    let x = Term::variable("$x");

    assert_eq!(
        Variables::new(vec![x.clone(), x.clone()]),
        Err(Error::DuplicateVariable(x.to_string()))
    );
    assert!(Variables::new(vec![Term::number(1)]).is_err());
}

#[test]
fn test_declarations() {
    let x = Term::variable("$x");
    let y = Term::variable("$y");

    assert!(Variables::is_declaration(&x));
    assert!(Variables::is_declaration(&typed(&x, &["NumberNode"])));
    assert!(Variables::is_declaration(&Term::link(VARIABLE_LIST, vec![])));
    assert!(!Variables::is_declaration(&Term::number(1)));
    assert!(!Variables::is_declaration(&Term::list(vec![x.clone()])));

    let single = Variables::from_declaration(&x).expect("ok");
    assert_eq!(single.varseq(), &[x.clone()]);

    let list = Term::link(
        VARIABLE_LIST,
        vec![typed(&x, &["NumberNode", "ConceptNode"]), y.clone()],
    );
    let vars = Variables::from_declaration(&list).expect("ok");
    assert_eq!(vars.varseq(), &[x.clone(), y.clone()]);
    assert_eq!(vars.restriction(&x).map(|types| types.len()), Some(2));
    assert_eq!(vars.restriction(&y), None);
}

#[test]
fn test_typed_acceptance() {
    let x = Term::variable("$x");
    let vars = Variables::from_declaration(&typed(&x, &["NumberNode"])).expect("ok");

    assert!(vars.is_type(&x, &Term::number(5)));
    assert!(!vars.is_type(&x, &Term::node("ConceptNode", "5")));
    // Restrictions are exact: no subtype widening.
    assert!(!vars.is_type(&x, &Term::node("Node", "5")));
    assert!(vars.accepts(&x, &Term::number(6)));
}

#[test]
fn test_malformed_declarations() {
    let x = Term::variable("$x");

    // A TypedVariableLink must have exactly a variable and a type.
    assert!(Variables::from_declaration(&Term::link(TYPED_VARIABLE_LINK, vec![x.clone()])).is_err());
    assert!(Variables::from_declaration(&Term::link(
        TYPED_VARIABLE_LINK,
        vec![Term::number(1), Term::node(TYPE_NODE, "NumberNode")]
    ))
    .is_err());
    // Types must be named by TypeNodes.
    assert!(Variables::from_declaration(&Term::link(
        TYPED_VARIABLE_LINK,
        vec![x.clone(), Term::node("ConceptNode", "NumberNode")]
    ))
    .is_err());
    // Lists may only hold declarations.
    assert!(Variables::from_declaration(&Term::link(
        VARIABLE_LIST,
        vec![x.clone(), Term::number(2)]
    ))
    .is_err());
    assert!(Variables::from_declaration(&Term::link(
        VARIABLE_LIST,
        vec![x.clone(), typed(&x, &["NumberNode"])]
    ))
    .is_err());
}

#[test]
fn test_closure_predicate() {
    let only_numbers = |_var: &Term, candidate: &Term| candidate.ty().name() == "NumberNode";
    let predicate: &dyn TypePredicate = &only_numbers;

    assert!(predicate.accepts(&Term::variable("$x"), &Term::number(1)));
    assert!(!predicate.accepts(&Term::variable("$x"), &Term::list(vec![])));
}
