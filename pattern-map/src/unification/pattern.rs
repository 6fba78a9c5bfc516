//! Patterns describe expectations to match ground terms against.  A
//! successful match yields a `Grounding` for the scope's variables.
//!
//! The pattern tree is a function of the declaration, not of the
//! data, so we compile it once: subtrees without any variable or
//! alternation collapse to constants (matched by identity), and
//! alternation nodes are recognised via the type hierarchy here,
//! rather than on every match.
use super::{Grounding, TypePredicate, Variables};
use crate::ground::types::CHOICE_LINK;
use crate::ground::{Term, TypeHierarchy};

#[derive(Clone, Debug)]
enum Node {
    /// A declared variable, by index in the scope's `varseq`.
    Variable { term: Term, index: usize },
    /// Alternatives, tried in order: the first one that matches wins.
    Choice { term: Term, alternatives: Vec<Node> },
    /// Any other link: same type, same arity, and pairwise match.
    Link { term: Term, outgoing: Vec<Node> },
    /// A subtree without variable or alternation must match exactly.
    Constant(Term),
}

impl Node {
    fn compile(term: &Term, variables: &Variables, hierarchy: &TypeHierarchy) -> Self {
        if let Some(index) = variables.index_of(term) {
            return Node::Variable {
                term: term.clone(),
                index,
            };
        }

        if !term.is_link() {
            return Node::Constant(term.clone());
        }

        let outgoing: Vec<Node> = term
            .outgoing()
            .iter()
            .map(|child| Node::compile(child, variables, hierarchy))
            .collect();

        if hierarchy.is_a(term.ty(), &CHOICE_LINK) {
            Node::Choice {
                term: term.clone(),
                alternatives: outgoing,
            }
        } else if outgoing.iter().all(|child| matches!(child, Node::Constant(_))) {
            Node::Constant(term.clone())
        } else {
            Node::Link {
                term: term.clone(),
                outgoing,
            }
        }
    }

    fn extract(&self, ground: &Term, accepts: &dyn TypePredicate, grounding: &mut Grounding) -> bool {
        match self {
            Node::Constant(term) => term == ground,
            Node::Variable { term, index } => {
                if term == ground {
                    return true;
                }

                match grounding.get(*index) {
                    Some(value) => value == ground,
                    None => accepts.accepts(term, ground) && grounding.bind(*index, ground.clone()),
                }
            }
            Node::Choice { term, alternatives } => {
                // Only a ground choice of the same type can be the
                // choice itself; skip the deep comparison otherwise.
                if term.same_allocation(ground) || (term.ty() == ground.ty() && term == ground) {
                    return true;
                }

                for alternative in alternatives {
                    let mut attempt = grounding.clone();
                    if alternative.extract(ground, accepts, &mut attempt) {
                        *grounding = attempt;
                        return true;
                    }
                }

                false
            }
            Node::Link { term, outgoing } => {
                // Structural equality follows from the tag, arity and
                // child checks below; this is only a fast path.
                if term.same_allocation(ground) {
                    return true;
                }

                if !ground.is_link() || term.ty() != ground.ty() {
                    return false;
                }

                let children = ground.outgoing();
                children.len() == outgoing.len()
                    && outgoing
                        .iter()
                        .zip(children)
                        .all(|(pattern, child)| pattern.extract(child, accepts, grounding))
            }
        }
    }
}

/// A compiled pattern body.
///
/// Every link, `SetLink`s included, is matched child by child.  Sets
/// are thus matched in their canonical (sorted) order, not as sets: a
/// set pattern with variables only matches ground sets whose members
/// sort in the same positions.
#[derive(Clone, Debug)]
pub struct Pattern {
    body: Term,
    width: usize,
    root: Node,
}

impl Pattern {
    /// Compiles `body`, where `variables` are the pattern variables;
    /// any other `VariableNode` is a constant.
    #[must_use]
    pub fn new(body: &Term, variables: &Variables, hierarchy: &TypeHierarchy) -> Self {
        Self {
            body: body.clone(),
            width: variables.len(),
            root: Node::compile(body, variables, hierarchy),
        }
    }

    #[must_use]
    pub fn body(&self) -> &Term {
        &self.body
    }

    /// Groundings for this pattern have one slot per variable.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Recursively compares the pattern with `ground`, and adds
    /// variable bindings to `grounding`.  Repeated variables must match
    /// identical ground terms, and `accepts` must allow each new
    /// binding.
    ///
    /// If false is returned, the contents of `grounding` are
    /// unspecified and should be discarded.
    pub fn extract(&self, ground: &Term, accepts: &dyn TypePredicate, grounding: &mut Grounding) -> bool {
        assert_eq!(grounding.width(), self.width);
        self.root.extract(ground, accepts, grounding)
    }

    /// Matches `ground` from an empty grounding.
    #[inline]
    #[must_use]
    pub fn try_match(&self, ground: &Term, accepts: &dyn TypePredicate) -> Option<Grounding> {
        let mut grounding = Grounding::new(self.width);

        if self.extract(ground, accepts, &mut grounding) {
            Some(grounding)
        } else {
            None
        }
    }
}

#[cfg(test)]
fn compile(body: &Term, vars: &[&Term]) -> (Pattern, Variables) {
    let variables = Variables::new(vars.iter().map(|var| (*var).clone())).expect("ok");
    let pattern = Pattern::new(body, &variables, &TypeHierarchy::standard());

    (pattern, variables)
}

#[test]
fn test_pattern_match_happy_path() {
    let x = Term::variable("$x");
    let y = Term::variable("$y");
    let (pattern, vars) = compile(&Term::link("pair", vec![x.clone(), y.clone()]), &[&x, &y]);

    let ground = Term::link("pair", vec![Term::number(1), Term::number(2)]);
    let grounding = pattern.try_match(&ground, &vars).expect("matches");

    assert_eq!(
        grounding.values(),
        &[Some(Term::number(1)), Some(Term::number(2))]
    );
}

#[test]
fn test_pattern_repeated_variable() {
    let x = Term::variable("$x");
    let (pattern, vars) = compile(&Term::link("eq", vec![x.clone(), x.clone()]), &[&x]);

    let same = Term::link("eq", vec![Term::number(7), Term::number(7)]);
    let grounding = pattern.try_match(&same, &vars).expect("matches");
    assert_eq!(grounding.get(0), Some(&Term::number(7)));

    let different = Term::link("eq", vec![Term::number(7), Term::number(8)]);
    assert_eq!(pattern.try_match(&different, &vars), None);
}

#[test]
fn test_pattern_mismatch() {
    let x = Term::variable("$x");
    let (pattern, vars) = compile(
        &Term::link("f", vec![x.clone(), Term::node("ConceptNode", "a")]),
        &[&x],
    );

    // Wrong type.
    let ground = Term::link("g", vec![Term::number(1), Term::node("ConceptNode", "a")]);
    assert!(pattern.try_match(&ground, &vars).is_none());

    // Wrong arity.
    let ground = Term::link("f", vec![Term::number(1)]);
    assert!(pattern.try_match(&ground, &vars).is_none());

    // Wrong constant.
    let ground = Term::link("f", vec![Term::number(1), Term::node("ConceptNode", "b")]);
    assert!(pattern.try_match(&ground, &vars).is_none());

    // A node with the link's type is not a link.
    let ground = Term::node("f", "x");
    assert!(pattern.try_match(&ground, &vars).is_none());

    let ground = Term::link("f", vec![Term::number(1), Term::node("ConceptNode", "a")]);
    assert!(pattern.try_match(&ground, &vars).is_some());
}

#[test]
fn test_pattern_type_gate() {
    let x = Term::variable("$x");
    let (pattern, _) = compile(&Term::link("f", vec![x.clone()]), &[&x]);
    let numbers_only = |_var: &Term, candidate: &Term| candidate.ty().name() == "NumberNode";

    assert!(pattern
        .try_match(&Term::link("f", vec![Term::number(3)]), &numbers_only)
        .is_some());
    assert!(pattern
        .try_match(&Term::link("f", vec![Term::node("ConceptNode", "3")]), &numbers_only)
        .is_none());
}

#[test]
fn test_pattern_identity_short_circuit() {
    let x = Term::variable("$x");
    let body = Term::link("f", vec![x.clone()]);
    let (pattern, vars) = compile(&body, &[&x]);

    // Matching the body against itself succeeds without binding.
    let grounding = pattern.try_match(&body, &vars).expect("matches");
    assert_eq!(grounding.bound(), 0);
}

#[test]
fn test_undeclared_variables_are_constants() {
    let x = Term::variable("$x");
    let y = Term::variable("$y");
    let (pattern, vars) = compile(&Term::link("f", vec![x.clone(), y.clone()]), &[&x]);

    assert!(pattern
        .try_match(&Term::link("f", vec![Term::number(1), y.clone()]), &vars)
        .is_some());
    assert!(pattern
        .try_match(&Term::link("f", vec![Term::number(1), Term::number(2)]), &vars)
        .is_none());
}

#[test]
fn test_choice_first_match_wins() {
    let x = Term::variable("$x");
    let y = Term::variable("$y");
    let body = Term::link(
        CHOICE_LINK,
        vec![
            Term::link("f", vec![x.clone(), Term::number(0)]),
            Term::link("f", vec![Term::number(1), y.clone()]),
            Term::link("f", vec![x.clone(), y.clone()]),
        ],
    );
    let (pattern, vars) = compile(&body, &[&x, &y]);

    // Only the first alternative's bindings are adopted.
    let grounding = pattern
        .try_match(&Term::link("f", vec![Term::number(1), Term::number(0)]), &vars)
        .expect("matches");
    assert_eq!(grounding.values(), &[Some(Term::number(1)), None]);

    // A failed alternative leaves no stray binding behind.
    let grounding = pattern
        .try_match(&Term::link("f", vec![Term::number(1), Term::number(5)]), &vars)
        .expect("matches");
    assert_eq!(grounding.values(), &[None, Some(Term::number(5))]);

    let grounding = pattern
        .try_match(&Term::link("f", vec![Term::number(2), Term::number(5)]), &vars)
        .expect("matches");
    assert_eq!(
        grounding.values(),
        &[Some(Term::number(2)), Some(Term::number(5))]
    );

    assert!(pattern.try_match(&Term::link("g", vec![]), &vars).is_none());
}

#[test]
fn test_choice_respects_prior_bindings() {
    let x = Term::variable("$x");
    // (pair $x (Choice (a $x) (b $x)))
    let body = Term::link(
        "pair",
        vec![
            x.clone(),
            Term::link(
                CHOICE_LINK,
                vec![Term::link("a", vec![x.clone()]), Term::link("b", vec![x.clone()])],
            ),
        ],
    );
    let (pattern, vars) = compile(&body, &[&x]);

    let ok = Term::link("pair", vec![Term::number(1), Term::link("b", vec![Term::number(1)])]);
    assert!(pattern.try_match(&ok, &vars).is_some());

    let conflict = Term::link("pair", vec![Term::number(1), Term::link("b", vec![Term::number(2)])]);
    assert!(pattern.try_match(&conflict, &vars).is_none());
}

#[test]
fn test_user_alternation_type() {
    use crate::ground::Type;

    let either = Type::new("EitherLink");
    let mut hierarchy = TypeHierarchy::standard();
    hierarchy.add(either.clone(), CHOICE_LINK);

    let x = Term::variable("$x");
    let vars = Variables::new(vec![x.clone()]).expect("ok");
    let body = Term::link(either, vec![Term::link("f", vec![x.clone()]), Term::link("g", vec![x.clone()])]);

    let pattern = Pattern::new(&body, &vars, &hierarchy);
    assert!(pattern.try_match(&Term::link("g", vec![Term::number(4)]), &vars).is_some());

    // Without the hierarchy edge, the same link is matched structurally.
    let plain = Pattern::new(&body, &vars, &TypeHierarchy::standard());
    assert!(plain.try_match(&Term::link("g", vec![Term::number(4)]), &vars).is_none());
}

#[test]
fn test_pattern_fresh_copy_of_body() {
    let x = Term::variable("$x");
    let choice = Term::link(
        CHOICE_LINK,
        vec![Term::link("a", vec![x.clone()]), Term::link("b", vec![x.clone()])],
    );
    let body = Term::link("f", vec![Term::link("g", vec![x.clone()]), choice]);
    let (pattern, vars) = compile(&body, &[&x]);

    // A structurally equal term in its own allocation still matches
    // itself, down to the embedded choice, without binding anything.
    let copy = Term::link(
        "f",
        vec![
            Term::link("g", vec![Term::variable("$x")]),
            Term::link(
                CHOICE_LINK,
                vec![
                    Term::link("a", vec![Term::variable("$x")]),
                    Term::link("b", vec![Term::variable("$x")]),
                ],
            ),
        ],
    );
    assert!(!copy.same_allocation(&body));

    let grounding = pattern.try_match(&copy, &vars).expect("matches");
    assert_eq!(grounding.bound(), 0);
}

#[test]
fn test_pattern_deep_chain() {
    let x = Term::variable("$x");
    let mut body = x.clone();
    let mut ground = Term::number(42);
    for _ in 0..512 {
        body = Term::link("f", vec![body]);
        ground = Term::link("f", vec![ground]);
    }

    let (pattern, vars) = compile(&body, &[&x]);
    let grounding = pattern.try_match(&ground, &vars).expect("matches");
    assert_eq!(grounding.values(), &[Some(Term::number(42))]);

    let shorter = ground.outgoing()[0].clone();
    assert!(pattern.try_match(&shorter, &vars).is_none());
}

#[test]
fn test_sets_match_in_canonical_order() {
    use crate::ground::types::CONCEPT_NODE;

    let x = Term::variable("$x");
    let a = Term::node(CONCEPT_NODE, "a");
    // Sorted as ((ConceptNode "a") (VariableNode "$x")).
    let (pattern, vars) = compile(&Term::set(vec![x.clone(), a.clone()]), &[&x]);

    // NumberNode sorts after ConceptNode: positions line up.
    let grounding = pattern
        .try_match(&Term::set(vec![Term::number(1), a.clone()]), &vars)
        .expect("matches");
    assert_eq!(grounding.get(0), Some(&Term::number(1)));

    // AnchorNode sorts before ConceptNode: no match, even though a
    // set-wise match exists.
    assert!(pattern
        .try_match(&Term::set(vec![Term::node("AnchorNode", "z"), a.clone()]), &vars)
        .is_none());
}
