//! A rewriter packages everything needed to turn one ground term
//! into one result: the compiled pattern, the scope's variables and
//! type predicate, and, for implications, the compiled rewrite
//! target.
//!
//! Rewriting happens in two stages, `ground` then `instantiate`, which
//! the dataflow lowering uses separately.
use crate::ground::{Term, TypeHierarchy};
use crate::unification::{Grounding, Pattern, ScopeLink, Template, TypePredicate, Variables};
use std::sync::Arc;

#[derive(Clone)]
pub struct Rewriter {
    variables: Arc<Variables>,
    pattern: Arc<Pattern>,
    template: Option<Arc<Template>>,
    accepts: Arc<dyn TypePredicate>,
    /// Plain patterns must ground every variable; implications may
    /// leave some ungrounded, since their target may ignore them.
    require_full_grounding: bool,
}

impl Rewriter {
    /// Compiles the body of `scope`, and the `rewrite` target if any.
    /// Bindings are checked against the scope's declared types until
    /// `with_type_predicate` says otherwise.
    #[must_use]
    pub fn new(scope: &ScopeLink, rewrite: Option<&Term>, hierarchy: &TypeHierarchy) -> Self {
        let variables = Arc::new(scope.variables().clone());
        let pattern = Pattern::new(scope.body(), &variables, hierarchy);
        let template = rewrite.map(|target| Arc::new(Template::new(target, &variables, hierarchy)));
        let accepts: Arc<dyn TypePredicate> = variables.clone();

        Self {
            require_full_grounding: template.is_none(),
            variables,
            pattern: Arc::new(pattern),
            template,
            accepts,
        }
    }

    /// Replaces the type predicate consulted for new bindings.
    #[must_use]
    pub fn with_type_predicate(mut self, accepts: Arc<dyn TypePredicate>) -> Self {
        self.accepts = accepts;
        self
    }

    #[must_use]
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    #[must_use]
    pub fn rewrite_target(&self) -> Option<&Term> {
        self.template.as_ref().map(|template| template.target())
    }

    #[must_use]
    pub fn require_full_grounding(&self) -> bool {
        self.require_full_grounding
    }

    /// Matches `term` against the pattern body.
    #[inline]
    #[must_use]
    pub fn ground(&self, term: &Term) -> Option<Grounding> {
        self.pattern.try_match(term, &*self.accepts)
    }

    /// Converts a grounding to a result.
    ///
    /// Implications substitute the grounding's values in the rewrite
    /// target, whether or not all variables are grounded.  Plain
    /// patterns fail on partial groundings, and otherwise return the
    /// value of their only variable, or a `ListLink` of all values in
    /// declaration order.
    #[must_use]
    pub fn instantiate(&self, grounding: &Grounding) -> Option<Term> {
        debug_assert_eq!(grounding.width(), self.variables.len());

        if self.require_full_grounding && !grounding.is_complete() {
            tracing::trace!(
                bound = grounding.bound(),
                declared = grounding.width(),
                "partial grounding for a plain pattern"
            );
            return None;
        }

        if let Some(template) = &self.template {
            return Some(template.instantiate(grounding.values()));
        }

        match grounding.values() {
            [value] => value.clone(),
            values => values
                .iter()
                .cloned()
                .collect::<Option<Vec<Term>>>()
                .map(Term::list),
        }
    }

    /// Matches `term`, and instantiates the result on success.
    #[inline]
    #[must_use]
    pub fn rewrite_one(&self, term: &Term) -> Option<Term> {
        self.ground(term)
            .and_then(|grounding| self.instantiate(&grounding))
    }
}

impl std::fmt::Debug for Rewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rewriter")
            .field("variables", &self.variables.varseq())
            .field("body", self.pattern.body())
            .field("rewrite_target", &self.rewrite_target())
            .field("require_full_grounding", &self.require_full_grounding)
            .finish()
    }
}

#[cfg(test)]
use crate::ground::types::{IMPLICATION_SCOPE_LINK, LAMBDA_LINK, VARIABLE_LIST};

#[cfg(test)]
fn rewriter(scope: Term, rewrite: Option<&Term>) -> Rewriter {
    let hierarchy = TypeHierarchy::standard();
    let scope = ScopeLink::new(&scope, &hierarchy).expect("ok");

    Rewriter::new(&scope, rewrite, &hierarchy)
}

#[test]
fn test_single_variable_unwraps() {
    let x = Term::variable("$x");
    let rewriter = rewriter(
        Term::link(LAMBDA_LINK, vec![x.clone(), Term::link("f", vec![x.clone()])]),
        None,
    );

    assert!(rewriter.require_full_grounding());
    assert_eq!(rewriter.rewrite_target(), None);
    assert_eq!(
        rewriter.rewrite_one(&Term::link("f", vec![Term::number(5)])),
        Some(Term::number(5))
    );
    assert_eq!(rewriter.rewrite_one(&Term::link("g", vec![Term::number(5)])), None);
}

#[test]
fn test_tuple_wraps() {
    let x = Term::variable("$x");
    let y = Term::variable("$y");
    let rewriter = rewriter(
        Term::link(
            LAMBDA_LINK,
            vec![
                Term::link(VARIABLE_LIST, vec![y.clone(), x.clone()]),
                Term::link("pair", vec![x.clone(), y.clone()]),
            ],
        ),
        None,
    );

    // Values come in declaration order, not body order.
    assert_eq!(
        rewriter.rewrite_one(&Term::link("pair", vec![Term::number(1), Term::number(2)])),
        Some(Term::list(vec![Term::number(2), Term::number(1)]))
    );
}

#[test]
fn test_partial_plain_pattern_fails() {
    let x = Term::variable("$x");
    let y = Term::variable("$y");
    // $y is declared, but does not appear in the body.
    let rewriter = rewriter(
        Term::link(
            LAMBDA_LINK,
            vec![
                Term::link(VARIABLE_LIST, vec![x.clone(), y.clone()]),
                Term::link("f", vec![x.clone()]),
            ],
        ),
        None,
    );

    let ground = Term::link("f", vec![Term::number(1)]);
    let grounding = rewriter.ground(&ground).expect("matches");
    assert!(!grounding.is_complete());
    assert_eq!(rewriter.instantiate(&grounding), None);
    assert_eq!(rewriter.rewrite_one(&ground), None);
}

#[test]
fn test_partial_implication_succeeds() {
    let x = Term::variable("$x");
    let y = Term::variable("$y");
    let target = Term::link("g", vec![x.clone()]);
    let rewriter = rewriter(
        Term::link(
            IMPLICATION_SCOPE_LINK,
            vec![
                Term::link(VARIABLE_LIST, vec![x.clone(), y.clone()]),
                Term::link("f", vec![x.clone()]),
                target.clone(),
            ],
        ),
        Some(&target),
    );

    assert!(!rewriter.require_full_grounding());
    assert_eq!(
        rewriter.rewrite_one(&Term::link("f", vec![Term::number(1)])),
        Some(Term::link("g", vec![Term::number(1)]))
    );
}

#[test]
fn test_no_variables() {
    let constant = Term::link("f", vec![Term::number(1)]);
    let rewriter = rewriter(Term::link(LAMBDA_LINK, vec![constant.clone()]), None);

    assert!(rewriter.variables().is_empty());
    assert_eq!(rewriter.rewrite_one(&constant), Some(Term::list(vec![])));
    assert_eq!(rewriter.rewrite_one(&Term::number(1)), None);
}

#[test]
fn test_custom_type_predicate() {
    let x = Term::variable("$x");
    let rewriter = rewriter(
        Term::link(LAMBDA_LINK, vec![x.clone(), Term::link("f", vec![x.clone()])]),
        None,
    )
    .with_type_predicate(Arc::new(|_var: &Term, candidate: &Term| !candidate.is_link()));

    assert_eq!(
        rewriter.rewrite_one(&Term::link("f", vec![Term::number(1)])),
        Some(Term::number(1))
    );
    assert_eq!(
        rewriter.rewrite_one(&Term::link("f", vec![Term::list(vec![])])),
        None
    );
}
