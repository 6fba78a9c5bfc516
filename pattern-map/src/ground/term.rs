//! Terms are immutable typed trees.  A term is either a node (a type
//! and a name) or a link (a type and an ordered list of outgoing
//! terms).  We share subtrees by reference counting, so cloning a
//! term never copies the tree, and rewriting only allocates the spine
//! that actually changes.
use super::types::{Type, LIST_LINK, NUMBER_NODE, SET_LINK, VARIABLE_NODE};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
enum Atom {
    Node { ty: Type, name: String },
    Link { ty: Type, outgoing: Vec<Term> },
}

/// A `Term` is a cheaply clonable handle to an immutable tree.
///
/// Equality is structural, with a pointer comparison fast path: two
/// handles are equal iff they denote the same node.
#[derive(Clone, Debug, Ord, PartialOrd)]
pub struct Term(Arc<Atom>);

impl PartialEq for Term {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for Term {}

/// Hashes the denoted tree, so equal terms hash alike whether or not
/// they share an allocation.
impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (*self.0).hash(state);
    }
}

impl Term {
    /// Returns a new leaf of type `ty`.
    #[must_use]
    pub fn node(ty: impl Into<Type>, name: impl Into<String>) -> Self {
        Self(Arc::new(Atom::Node {
            ty: ty.into(),
            name: name.into(),
        }))
    }

    /// Returns a new composite term of type `ty`.
    ///
    /// `SetLink`s are unordered: their outgoing terms are sorted so
    /// that sets with the same members compare equal.  Patterns still
    /// match sets position by position, in this canonical order.
    #[must_use]
    pub fn link(ty: impl Into<Type>, mut outgoing: Vec<Term>) -> Self {
        let ty = ty.into();
        if ty == SET_LINK {
            outgoing.sort();
        }

        Self(Arc::new(Atom::Link { ty, outgoing }))
    }

    #[must_use]
    pub fn variable(name: impl Into<String>) -> Self {
        Self::node(VARIABLE_NODE, name)
    }

    #[must_use]
    pub fn number(value: impl std::fmt::Display) -> Self {
        Self::node(NUMBER_NODE, value.to_string())
    }

    #[must_use]
    pub fn list(outgoing: Vec<Term>) -> Self {
        Self::link(LIST_LINK, outgoing)
    }

    #[must_use]
    pub fn set(outgoing: Vec<Term>) -> Self {
        Self::link(SET_LINK, outgoing)
    }

    #[inline]
    #[must_use]
    pub fn ty(&self) -> &Type {
        match &*self.0 {
            Atom::Node { ty, .. } | Atom::Link { ty, .. } => ty,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_link(&self) -> bool {
        matches!(&*self.0, Atom::Link { .. })
    }

    /// Returns true for `VariableNode`s, whether or not any scope
    /// declares them.
    #[inline]
    #[must_use]
    pub fn is_variable(&self) -> bool {
        !self.is_link() && *self.ty() == VARIABLE_NODE
    }

    /// Returns the name of a node, and `None` for links.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match &*self.0 {
            Atom::Node { name, .. } => Some(name),
            Atom::Link { .. } => None,
        }
    }

    /// Returns the outgoing terms of a link; nodes have none.
    #[inline]
    #[must_use]
    pub fn outgoing(&self) -> &[Term] {
        match &*self.0 {
            Atom::Node { .. } => &[],
            Atom::Link { outgoing, .. } => outgoing,
        }
    }

    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.outgoing().len()
    }

    /// Returns true iff `self` and `other` share the same allocation.
    #[inline]
    #[must_use]
    pub fn same_allocation(&self, other: &Term) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &*self.0 {
            Atom::Node { ty, name } => write!(f, "({} {:?})", ty, name),
            Atom::Link { ty, outgoing } => {
                write!(f, "({}", ty)?;
                for child in outgoing {
                    write!(f, " {}", child)?;
                }

                write!(f, ")")
            }
        }
    }
}

#[test]
fn test_structural_equality() {
    let a = Term::list(vec![Term::number(1), Term::number(2)]);
    let b = Term::list(vec![Term::number(1), Term::number(2)]);
    let c = Term::list(vec![Term::number(2), Term::number(1)]);

    assert_eq!(a, b);
    assert!(!a.same_allocation(&b));
    assert_ne!(a, c);
    assert_eq!(a, a.clone());
    assert!(a.same_allocation(&a.clone()));
}

#[test]
fn test_node_link_distinction() {
    let leaf = Term::node("ConceptNode", "cat");
    let empty = Term::link("ConceptNode", vec![]);

    assert_ne!(leaf, empty);
    assert!(!leaf.is_link());
    assert!(empty.is_link());
    assert_eq!(leaf.name(), Some("cat"));
    assert_eq!(empty.name(), None);
    assert_eq!(leaf.arity(), 0);
    assert!(leaf.outgoing().is_empty());
}

#[test]
fn test_sets_are_unordered() {
    let a = Term::set(vec![Term::number(3), Term::number(1), Term::number(2)]);
    let b = Term::set(vec![Term::number(2), Term::number(3), Term::number(1)]);

    assert_eq!(a, b);
    assert_eq!(a.arity(), 3);

    // Lists keep their order.
    let x = Term::list(vec![Term::number(3), Term::number(1)]);
    let y = Term::list(vec![Term::number(1), Term::number(3)]);
    assert_ne!(x, y);
}

#[test]
fn test_variables() {
    assert!(Term::variable("$x").is_variable());
    assert!(!Term::node("ConceptNode", "$x").is_variable());
    assert!(!Term::link(VARIABLE_NODE, vec![]).is_variable());
}

#[test]
fn test_display() {
    let term = Term::link(
        "EvaluationLink",
        vec![
            Term::node("PredicateNode", "likes"),
            Term::list(vec![Term::number(1), Term::variable("$x")]),
        ],
    );

    assert_eq!(
        term.to_string(),
        r#"(EvaluationLink (PredicateNode "likes") (ListLink (NumberNode "1") (VariableNode "$x")))"#
    );
}

#[test]
fn test_hash_is_structural() {
    use std::collections::HashSet;

    let a = Term::list(vec![Term::number(1), Term::variable("$x")]);
    let b = Term::list(vec![Term::number(1), Term::variable("$x")]);
    assert!(!a.same_allocation(&b));

    let set: HashSet<Term> = vec![a.clone(), b, a.clone()].into_iter().collect();
    assert_eq!(set.len(), 1);
    assert!(set.contains(&Term::list(vec![Term::number(1), Term::variable("$x")])));
}
