//! A scope link binds variables in a body.  Its first outgoing term
//! is either an explicit variable declaration, followed by the body,
//! or directly the body, in which case the scope binds all the free
//! variables of its body.
//!
//! Scopes nest: a variable declared by an inner scope is bound there,
//! and is neither free in, nor substituted by, the outer scope.
use super::Variables;
use crate::error::{Error, Result};
use crate::ground::types::SCOPE_LINK;
use crate::ground::{Term, Type, TypeHierarchy};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScopeLink {
    term: Term,
    variables: Variables,
    /// 1 if the scope has an explicit declaration, 0 otherwise.
    body_index: usize,
}

impl ScopeLink {
    /// Parses `term` as a scope.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `term` is not a scope link, if it has no
    /// body, or if its variable declaration is malformed.
    pub fn new(term: &Term, hierarchy: &TypeHierarchy) -> Result<Self> {
        if !term.is_link() || !hierarchy.is_a(term.ty(), &SCOPE_LINK) {
            return Err(Error::UnexpectedType {
                expected: SCOPE_LINK,
                actual: term.ty().clone(),
            });
        }

        let outgoing = term.outgoing();
        let first = outgoing.first().ok_or_else(|| Error::TooShort {
            ty: term.ty().clone(),
            expected: 1,
            actual: 0,
        })?;

        if !Variables::is_declaration(first) {
            return Ok(Self {
                term: term.clone(),
                variables: free_variables(first, hierarchy),
                body_index: 0,
            });
        }

        if outgoing.len() < 2 {
            return Err(Error::TooShort {
                ty: term.ty().clone(),
                expected: 2,
                actual: outgoing.len(),
            });
        }

        Ok(Self {
            term: term.clone(),
            variables: Variables::from_declaration(first)?,
            body_index: 1,
        })
    }

    #[must_use]
    pub fn term(&self) -> &Term {
        &self.term
    }

    #[must_use]
    pub fn ty(&self) -> &Type {
        self.term.ty()
    }

    #[must_use]
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    #[must_use]
    pub fn body(&self) -> &Term {
        &self.term.outgoing()[self.body_index]
    }

    /// Returns the position of the body in the scope's outgoing terms.
    #[must_use]
    pub fn body_index(&self) -> usize {
        self.body_index
    }

    #[must_use]
    pub fn has_declaration(&self) -> bool {
        self.body_index > 0
    }
}

/// What a link binds for its own subtree.
pub(crate) enum Binder {
    /// Not a scope.
    Transparent,
    /// A scope with an explicit declaration.
    Declared(Variables),
    /// A scope without (usable) declaration binds every variable in
    /// its subtree.
    Opaque,
}

pub(crate) fn binder(term: &Term, hierarchy: &TypeHierarchy) -> Binder {
    if !term.is_link() || !hierarchy.is_a(term.ty(), &SCOPE_LINK) {
        return Binder::Transparent;
    }

    match term.outgoing().first() {
        Some(first) if Variables::is_declaration(first) => {
            match Variables::from_declaration(first) {
                Ok(vars) => Binder::Declared(vars),
                Err(_) => Binder::Opaque,
            }
        }
        _ => Binder::Opaque,
    }
}

/// Returns the free variables of `body`, in depth-first, left to
/// right, order of first occurrence.
#[must_use]
pub fn free_variables(body: &Term, hierarchy: &TypeHierarchy) -> Variables {
    fn walk(term: &Term, hierarchy: &TypeHierarchy, bound: &mut Vec<Term>, acc: &mut Vec<Term>) {
        if term.is_variable() {
            if !bound.contains(term) && !acc.contains(term) {
                acc.push(term.clone());
            }

            return;
        }

        match binder(term, hierarchy) {
            Binder::Opaque => {}
            Binder::Transparent => {
                for child in term.outgoing() {
                    walk(child, hierarchy, bound, acc);
                }
            }
            Binder::Declared(vars) => {
                let depth = bound.len();

                bound.extend(vars.varseq().iter().cloned());
                for child in term.outgoing() {
                    walk(child, hierarchy, bound, acc);
                }

                bound.truncate(depth);
            }
        }
    }

    let mut acc = Vec::new();
    walk(body, hierarchy, &mut Vec::new(), &mut acc);
    Variables::from_distinct(acc)
}

#[cfg(test)]
use crate::ground::types::{IMPLICATION_SCOPE_LINK, LAMBDA_LINK, VARIABLE_LIST};

#[test]
fn test_explicit_declaration() {
    let hierarchy = TypeHierarchy::standard();
    let x = Term::variable("$x");
    let y = Term::variable("$y");
    let body = Term::link("f", vec![y.clone(), x.clone()]);
    let term = Term::link(
        LAMBDA_LINK,
        vec![Term::link(VARIABLE_LIST, vec![x.clone(), y.clone()]), body.clone()],
    );

    let scope = ScopeLink::new(&term, &hierarchy).expect("ok");
    assert!(scope.has_declaration());
    assert_eq!(scope.body(), &body);
    assert_eq!(scope.body_index(), 1);
    assert_eq!(scope.variables().varseq(), &[x.clone(), y.clone()]);
    assert_eq!(scope.ty(), &LAMBDA_LINK);
}

#[test]
fn test_implicit_declaration() {
    let hierarchy = TypeHierarchy::standard();
    let x = Term::variable("$x");
    let y = Term::variable("$y");
    let body = Term::link("f", vec![y.clone(), x.clone(), y.clone()]);
    let term = Term::link(IMPLICATION_SCOPE_LINK, vec![body.clone(), Term::link("g", vec![x.clone()])]);

    let scope = ScopeLink::new(&term, &hierarchy).expect("ok");
    assert!(!scope.has_declaration());
    assert_eq!(scope.body(), &body);
    assert_eq!(scope.variables().varseq(), &[y.clone(), x.clone()]);
}

#[test]
fn test_not_a_scope() {
    let hierarchy = TypeHierarchy::standard();
    let list = Term::list(vec![Term::variable("$x")]);

    assert_eq!(
        ScopeLink::new(&list, &hierarchy),
        Err(Error::UnexpectedType {
            expected: SCOPE_LINK,
            actual: Type::new("ListLink"),
        })
    );
    assert!(ScopeLink::new(&Term::node(SCOPE_LINK, "oops"), &hierarchy).is_err());
}

#[test]
fn test_missing_body() {
    let hierarchy = TypeHierarchy::standard();

    assert!(ScopeLink::new(&Term::link(LAMBDA_LINK, vec![]), &hierarchy).is_err());
    assert_eq!(
        ScopeLink::new(
            &Term::link(LAMBDA_LINK, vec![Term::variable("$x")]),
            &hierarchy
        ),
        Err(Error::TooShort {
            ty: LAMBDA_LINK,
            expected: 2,
            actual: 1,
        })
    );
}

#[test]
fn test_nested_scopes_bind() {
    let hierarchy = TypeHierarchy::standard();
    let x = Term::variable("$x");
    let y = Term::variable("$y");
    let z = Term::variable("$z");

    // (f $x (Lambda $y (g $y $z)) (Lambda (h $x $z)))
    let body = Term::link(
        "f",
        vec![
            x.clone(),
            Term::link(
                LAMBDA_LINK,
                vec![y.clone(), Term::link("g", vec![y.clone(), z.clone()])],
            ),
            Term::link(
                LAMBDA_LINK,
                vec![Term::link("h", vec![x.clone(), Term::variable("$w")])],
            ),
        ],
    );

    let free = free_variables(&body, &hierarchy);
    assert_eq!(free.varseq(), &[x.clone(), z.clone()]);
}
