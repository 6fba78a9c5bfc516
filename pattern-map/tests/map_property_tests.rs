use pattern_map::ground::types::{
    CHOICE_LINK, CONCEPT_NODE, IMPLICATION_SCOPE_LINK, LAMBDA_LINK, NUMBER_NODE, SET_LINK,
    TYPED_VARIABLE_LINK, TYPE_NODE, VARIABLE_LIST,
};
use pattern_map::{MapLink, MapOptions, Term, TypeHierarchy};
use proptest::prelude::*;

const MAX_DEPTH: u32 = 3;
const MAX_ELEMENTS: usize = 8;

/// Ground terms: numbers and concepts at the leaves, `f`, `g` and `h`
/// links of arity 0 to 2 above them.  Never any variable.
fn ground_term() -> impl Strategy<Value = Term> {
    let leaf = prop_oneof![
        (0u32..20).prop_map(Term::number),
        prop::sample::select(vec!["cat", "dog", "fish"]).prop_map(|name| Term::node(CONCEPT_NODE, name)),
    ];

    leaf.prop_recursive(MAX_DEPTH, 24, 3, |inner| {
        (
            prop::sample::select(vec!["f", "g", "h"]),
            prop::collection::vec(inner, 0..3),
        )
            .prop_map(|(tag, outgoing)| Term::link(tag, outgoing))
    })
}

fn elements() -> impl Strategy<Value = Vec<Term>> {
    prop::collection::vec(ground_term(), 0..MAX_ELEMENTS)
}

fn x() -> Term {
    Term::variable("$x")
}

/// `\x. f(x)`
fn unwrap_f() -> Term {
    Term::link(LAMBDA_LINK, vec![x(), Term::link("f", vec![x()])])
}

fn map(scope: Term, input: Term) -> MapLink {
    MapLink::from_parts(scope, input, &TypeHierarchy::standard()).expect("well-formed map")
}

/// What `unwrap_f` should do to a single element.
fn expected_unwrap(term: &Term) -> Option<Term> {
    if term.ty().name() == "f" && term.arity() == 1 {
        Some(term.outgoing()[0].clone())
    } else {
        None
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn repeated_variables_bind_equal_subterms(t in ground_term(), u in ground_term()) {
        let scope = Term::link(LAMBDA_LINK, vec![x(), Term::link("f", vec![x(), x()])]);
        let map = map(scope, Term::list(vec![]));

        let result = map.rewrite_one(&Term::link("f", vec![t.clone(), u.clone()]));
        if t == u {
            prop_assert_eq!(result, Some(t));
        } else {
            prop_assert_eq!(result, None);
        }
    }

    #[test]
    fn links_match_on_tag_and_arity(term in ground_term()) {
        let map = map(unwrap_f(), Term::list(vec![]));

        prop_assert_eq!(map.rewrite_one(&term), expected_unwrap(&term));
    }

    #[test]
    fn declared_types_gate_bindings(term in ground_term()) {
        let decl = Term::link(
            TYPED_VARIABLE_LINK,
            vec![x(), Term::node(TYPE_NODE, NUMBER_NODE.name())],
        );
        let scope = Term::link(LAMBDA_LINK, vec![decl, Term::link("g", vec![x()])]);
        let map = map(scope, Term::list(vec![]));

        let result = map.rewrite_one(&Term::link("g", vec![term.clone()]));
        if term.ty() == &NUMBER_NODE {
            prop_assert_eq!(result, Some(term));
        } else {
            prop_assert_eq!(result, None);
        }
    }

    #[test]
    fn choices_try_every_alternative(term in ground_term()) {
        let choice = Term::link(
            CHOICE_LINK,
            vec![Term::link("f", vec![x()]), Term::link("g", vec![x()])],
        );
        let map = map(Term::link(LAMBDA_LINK, vec![x(), choice]), Term::list(vec![]));

        let expected = if (term.ty().name() == "f" || term.ty().name() == "g") && term.arity() == 1 {
            Some(term.outgoing()[0].clone())
        } else {
            None
        };
        prop_assert_eq!(map.rewrite_one(&term), expected);
    }

    #[test]
    fn constant_bodies_match_only_themselves(body in ground_term(), other in ground_term()) {
        let map = map(Term::link(LAMBDA_LINK, vec![body.clone()]), Term::list(vec![]));

        prop_assert_eq!(map.rewrite_one(&body), Some(Term::list(vec![])));
        if other != body {
            prop_assert_eq!(map.rewrite_one(&other), None);
        }
    }

    #[test]
    fn tuples_follow_declaration_order(t in ground_term(), u in ground_term()) {
        let y = Term::variable("$y");
        let scope = Term::link(
            LAMBDA_LINK,
            vec![
                Term::link(VARIABLE_LIST, vec![y.clone(), x()]),
                Term::link("h", vec![x(), y.clone()]),
            ],
        );
        let map = map(scope, Term::list(vec![]));

        prop_assert_eq!(
            map.rewrite_one(&Term::link("h", vec![t.clone(), u.clone()])),
            Some(Term::list(vec![u, t]))
        );
    }

    #[test]
    fn ordered_sequences_keep_order(elements in elements()) {
        let expected: Vec<Term> = elements.iter().filter_map(expected_unwrap).collect();
        let map = map(unwrap_f(), Term::list(elements));

        prop_assert_eq!(map.execute(), Some(Term::list(expected)));
    }

    #[test]
    fn unordered_collections_stay_unordered(elements in elements()) {
        let expected: Vec<Term> = elements.iter().filter_map(expected_unwrap).collect();
        let map = map(unwrap_f(), Term::set(elements));

        let result = map.execute().expect("collections always map");
        prop_assert_eq!(result.ty(), &SET_LINK);
        prop_assert_eq!(result, Term::set(expected));
    }

    #[test]
    fn identity_implications_preserve_input(elements in elements()) {
        let scope = Term::link(IMPLICATION_SCOPE_LINK, vec![x(), x(), x()]);
        let input = Term::list(elements);
        let map = map(scope, input.clone());

        prop_assert_eq!(map.execute(), Some(input));
    }

    #[test]
    fn parallel_mapping_is_sequential_mapping(elements in elements(), threshold in 0usize..4) {
        let map = map(unwrap_f(), Term::list(elements));
        let parallel = map.clone().with_options(MapOptions::parallel(threshold));

        prop_assert_eq!(parallel.execute(), map.execute());
    }
}
