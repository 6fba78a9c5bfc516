//! A `MapLink` applies a function, given as a scope, to some data:
//! `MapLink(scope, input)`.
//!
//! If the scope is an `ImplicationScopeLink`, of the form `P(x) -> Q(x)`
//! (or `vars, P(x) -> Q(x)` with an explicit declaration), every input
//! that matches `P` is rewritten to the corresponding instance of `Q`.
//! Any other scope is a plain pattern, and every input that matches
//! its body is mapped to the values of its variables.
//!
//! The input is either a single term, or a `ListLink` or `SetLink` of
//! terms; each element that fails to match is dropped from the
//! output collection.
use super::{CollectionShape, Evaluate, Rewriter};
use crate::config::MapOptions;
use crate::error::{Error, Result};
use crate::ground::types::{IMPLICATION_SCOPE_LINK, MAP_LINK};
use crate::ground::{Term, TypeHierarchy};
use crate::unification::{ScopeLink, TypePredicate};
use rayon::prelude::*;
use std::sync::Arc;

#[derive(Clone)]
pub struct MapLink {
    term: Term,
    scope: ScopeLink,
    rewriter: Rewriter,
    evaluator: Option<Arc<dyn Evaluate>>,
    options: MapOptions,
}

impl MapLink {
    /// Validates and compiles `term`, which must be a `MapLink` (or a
    /// subtype) with exactly a scope and an input.
    ///
    /// # Errors
    ///
    /// Returns `Err` on malformed declarations: wrong type or arity,
    /// a first outgoing term that isn't a scope, or an implication
    /// without a rewrite target.
    pub fn new(term: &Term, hierarchy: &TypeHierarchy) -> Result<Self> {
        if !term.is_link() || !hierarchy.is_a(term.ty(), &MAP_LINK) {
            return Err(Error::UnexpectedType {
                expected: MAP_LINK,
                actual: term.ty().clone(),
            });
        }

        if term.arity() != 2 {
            return Err(Error::Arity {
                ty: term.ty().clone(),
                expected: 2,
                actual: term.arity(),
            });
        }

        let scope = ScopeLink::new(&term.outgoing()[0], hierarchy)?;
        let rewrite = if hierarchy.is_a(scope.ty(), &IMPLICATION_SCOPE_LINK) {
            Some(rewrite_target(&scope)?)
        } else {
            None
        };

        let rewriter = Rewriter::new(&scope, rewrite, hierarchy);
        tracing::debug!(
            scope = %scope.ty(),
            variables = scope.variables().len(),
            implication = rewrite.is_some(),
            "compiled map declaration"
        );

        Ok(Self {
            term: term.clone(),
            scope,
            rewriter,
            evaluator: None,
            options: MapOptions::default(),
        })
    }

    /// Builds and validates `MapLink(scope, input)`.
    ///
    /// # Errors
    ///
    /// Same as `new`.
    pub fn from_parts(scope: Term, input: Term, hierarchy: &TypeHierarchy) -> Result<Self> {
        Self::new(&Term::link(MAP_LINK, vec![scope, input]), hierarchy)
    }

    /// Checks new bindings with `accepts` instead of the scope's
    /// declared types.
    #[must_use]
    pub fn with_type_predicate<P: TypePredicate + 'static>(mut self, accepts: P) -> Self {
        self.rewriter = self.rewriter.with_type_predicate(Arc::new(accepts));
        self
    }

    /// Evaluates the input with `evaluator` before mapping over it.
    #[must_use]
    pub fn with_evaluator<E: Evaluate + 'static>(mut self, evaluator: E) -> Self {
        self.evaluator = Some(Arc::new(evaluator));
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: MapOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn term(&self) -> &Term {
        &self.term
    }

    #[must_use]
    pub fn scope(&self) -> &ScopeLink {
        &self.scope
    }

    /// Returns the data the map applies to.
    #[must_use]
    pub fn input(&self) -> &Term {
        &self.term.outgoing()[1]
    }

    #[must_use]
    pub fn rewriter(&self) -> &Rewriter {
        &self.rewriter
    }

    #[must_use]
    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    #[must_use]
    pub fn is_implication(&self) -> bool {
        self.rewriter.rewrite_target().is_some()
    }

    /// Applies the map to one ground term.
    #[inline]
    #[must_use]
    pub fn rewrite_one(&self, term: &Term) -> Option<Term> {
        self.rewriter.rewrite_one(term)
    }

    /// Applies the map to its own input.
    #[must_use]
    pub fn execute(&self) -> Option<Term> {
        self.execute_on(self.input())
    }

    /// Applies the map to `input`.  Collections (`ListLink`s and
    /// `SetLink`s) are mapped element-wise into a collection of the
    /// same type, without the elements that fail to match; anything
    /// else is rewritten directly, and `None` means it did not match.
    #[must_use]
    pub fn execute_on(&self, input: &Term) -> Option<Term> {
        let evaluated;
        let input = match &self.evaluator {
            Some(evaluator) => {
                evaluated = evaluator.evaluate(input);
                &evaluated
            }
            None => input,
        };

        let shape = CollectionShape::of(input);
        if !shape.is_collection() {
            return self.rewrite_element(input);
        }

        let elements = input.outgoing();
        let results: Vec<Term> = if self.options.parallelize(elements.len()) {
            elements
                .par_iter()
                .filter_map(|element| self.rewrite_element(element))
                .collect()
        } else {
            elements
                .iter()
                .filter_map(|element| self.rewrite_element(element))
                .collect()
        };

        tracing::debug!(
            ?shape,
            inputs = elements.len(),
            outputs = results.len(),
            "mapped collection"
        );
        Some(Term::link(input.ty().clone(), results))
    }

    fn rewrite_element(&self, element: &Term) -> Option<Term> {
        let result = self.rewriter.rewrite_one(element);

        if result.is_none() {
            tracing::trace!(%element, "dropping element that does not map");
        }

        result
    }
}

/// Finds the rewrite target of an implication: the term right after
/// the body.
fn rewrite_target(scope: &ScopeLink) -> Result<&Term> {
    let outgoing = scope.term().outgoing();
    let index = scope.body_index() + 1;

    outgoing.get(index).ok_or_else(|| Error::TooShort {
        ty: scope.ty().clone(),
        expected: index + 1,
        actual: outgoing.len(),
    })
}

impl std::fmt::Debug for MapLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapLink")
            .field("term", &self.term)
            .field("rewriter", &self.rewriter)
            .field("evaluator", &self.evaluator.is_some())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
use crate::ground::types::{LAMBDA_LINK, SCOPE_LINK, TYPED_VARIABLE_LINK, TYPE_NODE, VARIABLE_LIST};

#[cfg(test)]
fn implication(x: &Term) -> Term {
    Term::link(
        IMPLICATION_SCOPE_LINK,
        vec![
            x.clone(),
            Term::link("f", vec![x.clone()]),
            Term::link("g", vec![x.clone()]),
        ],
    )
}

#[test]
fn test_implication_singleton() {
    let x = Term::variable("$x");
    let map = MapLink::from_parts(
        implication(&x),
        Term::link("f", vec![Term::number(5)]),
        &TypeHierarchy::standard(),
    )
    .expect("ok");

    assert!(map.is_implication());
    assert_eq!(map.execute(), Some(Term::link("g", vec![Term::number(5)])));
}

#[test]
fn test_singleton_failure() {
    let x = Term::variable("$x");
    let map = MapLink::from_parts(
        implication(&x),
        Term::link("h", vec![Term::number(5)]),
        &TypeHierarchy::standard(),
    )
    .expect("ok");

    assert_eq!(map.execute(), None);
}

#[test]
fn test_plain_ordered_sequence() {
    let x = Term::variable("$x");
    let y = Term::variable("$y");
    let scope = Term::link(
        LAMBDA_LINK,
        vec![
            Term::link(VARIABLE_LIST, vec![x.clone(), y.clone()]),
            Term::link("pair", vec![x.clone(), y.clone()]),
        ],
    );
    let input = Term::list(vec![
        Term::link("pair", vec![Term::number(1), Term::number(2)]),
        Term::link("pair", vec![Term::number(3), Term::number(3)]),
        Term::link("mismatch", vec![Term::number(9)]),
    ]);
    let map = MapLink::from_parts(scope, input, &TypeHierarchy::standard()).expect("ok");

    assert!(!map.is_implication());
    assert_eq!(
        map.execute(),
        Some(Term::list(vec![
            Term::list(vec![Term::number(1), Term::number(2)]),
            Term::list(vec![Term::number(3), Term::number(3)]),
        ]))
    );
}

#[test]
fn test_unordered_collection() {
    let x = Term::variable("$x");
    let map = MapLink::from_parts(
        implication(&x),
        Term::set(vec![
            Term::link("f", vec![Term::number(1)]),
            Term::link("h", vec![Term::number(2)]),
            Term::link("f", vec![Term::number(3)]),
        ]),
        &TypeHierarchy::standard(),
    )
    .expect("ok");

    assert_eq!(
        map.execute(),
        Some(Term::set(vec![
            Term::link("g", vec![Term::number(3)]),
            Term::link("g", vec![Term::number(1)]),
        ]))
    );
}

#[test]
fn test_empty_collection() {
    let x = Term::variable("$x");
    let map = MapLink::from_parts(implication(&x), Term::list(vec![]), &TypeHierarchy::standard())
        .expect("ok");

    assert_eq!(map.execute(), Some(Term::list(vec![])));
}

#[test]
fn test_implicit_implication() {
    let x = Term::variable("$x");
    // P(x) -> Q(x), without declaration.
    let scope = Term::link(
        IMPLICATION_SCOPE_LINK,
        vec![
            Term::link("f", vec![x.clone()]),
            Term::link("g", vec![x.clone(), x.clone()]),
        ],
    );
    let map = MapLink::from_parts(
        scope,
        Term::link("f", vec![Term::number(2)]),
        &TypeHierarchy::standard(),
    )
    .expect("ok");

    assert_eq!(
        map.execute(),
        Some(Term::link("g", vec![Term::number(2), Term::number(2)]))
    );
}

#[test]
fn test_typed_variables_filter() {
    let x = Term::variable("$x");
    let decl = Term::link(
        TYPED_VARIABLE_LINK,
        vec![x.clone(), Term::node(TYPE_NODE, "NumberNode")],
    );
    let scope = Term::link(LAMBDA_LINK, vec![decl, Term::link("f", vec![x.clone()])]);
    let input = Term::list(vec![
        Term::link("f", vec![Term::number(1)]),
        Term::link("f", vec![Term::node("ConceptNode", "one")]),
        Term::link("f", vec![Term::number(2)]),
    ]);
    let map = MapLink::from_parts(scope, input, &TypeHierarchy::standard()).expect("ok");

    assert_eq!(
        map.execute(),
        Some(Term::list(vec![Term::number(1), Term::number(2)]))
    );

    // An injected predicate replaces the declared types.
    let anything = map.with_type_predicate(|_var: &Term, _candidate: &Term| true);
    assert_eq!(
        anything.execute().map(|result| result.arity()),
        Some(3)
    );
}

#[test]
fn test_evaluator_runs_first() {
    let x = Term::variable("$x");
    let scope = Term::link(LAMBDA_LINK, vec![x.clone(), Term::link("f", vec![x.clone()])]);
    // The unevaluated input is not a collection.
    let input = Term::link("make-list", vec![Term::number(1), Term::number(2)]);
    let map = MapLink::from_parts(scope, input, &TypeHierarchy::standard()).expect("ok");

    assert_eq!(map.execute(), None);

    let evaluated = map.with_evaluator(|term: &Term| {
        if term.ty().name() == "make-list" {
            Term::list(
                term.outgoing()
                    .iter()
                    .map(|value| Term::link("f", vec![value.clone()]))
                    .collect(),
            )
        } else {
            term.clone()
        }
    });

    assert_eq!(
        evaluated.execute(),
        Some(Term::list(vec![Term::number(1), Term::number(2)]))
    );
}

#[test]
fn test_parallel_matches_sequential() {
    let x = Term::variable("$x");
    let input = Term::list(
        (0..200)
            .map(|i| {
                if i % 3 == 0 {
                    Term::link("h", vec![Term::number(i)])
                } else {
                    Term::link("f", vec![Term::number(i)])
                }
            })
            .collect(),
    );
    let map = MapLink::from_parts(implication(&x), input, &TypeHierarchy::standard()).expect("ok");
    let sequential = map.execute();
    let parallel = map.clone().with_options(MapOptions::parallel(16)).execute();

    assert_eq!(sequential.as_ref().map(Term::arity), Some(133));
    assert_eq!(sequential, parallel);
}

#[test]
fn test_malformed_map() {
    let hierarchy = TypeHierarchy::standard();
    let x = Term::variable("$x");

    // Not a MapLink.
    assert!(matches!(
        MapLink::new(&Term::list(vec![implication(&x), Term::number(1)]), &hierarchy),
        Err(Error::UnexpectedType { .. })
    ));

    // Wrong arity.
    assert_eq!(
        MapLink::new(&Term::link(MAP_LINK, vec![implication(&x)]), &hierarchy).map(|_| ()),
        Err(Error::Arity {
            ty: MAP_LINK,
            expected: 2,
            actual: 1,
        })
    );

    // First term is not a scope.
    assert_eq!(
        MapLink::from_parts(Term::list(vec![x.clone()]), Term::number(1), &hierarchy).map(|_| ()),
        Err(Error::UnexpectedType {
            expected: SCOPE_LINK,
            actual: crate::ground::types::LIST_LINK,
        })
    );
}

#[test]
fn test_short_implications() {
    let hierarchy = TypeHierarchy::standard();
    let x = Term::variable("$x");

    // Body first, but no rewrite target.
    let short = Term::link(IMPLICATION_SCOPE_LINK, vec![Term::link("f", vec![x.clone()])]);
    assert_eq!(
        MapLink::from_parts(short, Term::number(1), &hierarchy).map(|_| ()),
        Err(Error::TooShort {
            ty: IMPLICATION_SCOPE_LINK,
            expected: 2,
            actual: 1,
        })
    );

    // Declaration and body, but no rewrite target.
    let short = Term::link(
        IMPLICATION_SCOPE_LINK,
        vec![x.clone(), Term::link("f", vec![x.clone()])],
    );
    assert_eq!(
        MapLink::from_parts(short, Term::number(1), &hierarchy).map(|_| ()),
        Err(Error::TooShort {
            ty: IMPLICATION_SCOPE_LINK,
            expected: 3,
            actual: 2,
        })
    );
}

#[test]
fn test_map_subtypes() {
    let mut hierarchy = TypeHierarchy::standard();
    let my_map = crate::ground::Type::new("MyMapLink");
    hierarchy.add(my_map.clone(), MAP_LINK);

    let x = Term::variable("$x");
    let term = Term::link(
        my_map,
        vec![implication(&x), Term::link("f", vec![Term::number(0)])],
    );
    let map = MapLink::new(&term, &hierarchy).expect("ok");

    assert_eq!(map.term(), &term);
    assert_eq!(map.execute(), Some(Term::link("g", vec![Term::number(0)])));
}
