//! Lowering a rewriter converts it to a pair of differential dataflow
//! stages: a `flat_map` from ground terms to their groundings, and
//! another from groundings to rewritten terms.  Failed matches and
//! failed instantiations simply vanish from the output.
use super::GroundingCollection;
use crate::error::{Error, Result};
use crate::ground::Term;
use crate::map::Rewriter;
use differential_dataflow::lattice::Lattice;
use differential_dataflow::Collection;
use timely::dataflow::Scope;

/// Matches every term in `terms` against the rewriter's pattern, and
/// yields the grounding for each successful match.  The result is
/// tagged with the rewriter's variable sequence.
pub fn extract_groundings<G: Scope>(
    rewriter: &Rewriter,
    terms: &Collection<G, Term>,
) -> GroundingCollection<G>
where
    G::Timestamp: Lattice + Ord,
{
    let shape: Vec<Term> = rewriter.variables().varseq().into();
    let rewriter = rewriter.clone();
    let collection = terms.flat_map(move |term| rewriter.ground(&term));

    GroundingCollection::new(shape, collection)
}

/// Converts every grounding in `groundings` to a result term.
///
/// # Errors
///
/// Returns `Err(ShapeMismatch)` when the `groundings` were not
/// extracted for the rewriter's variable sequence.
pub fn instantiate_groundings<G: Scope>(
    rewriter: &Rewriter,
    groundings: &GroundingCollection<G>,
) -> Result<Collection<G, Term>>
where
    G::Timestamp: Lattice + Ord,
{
    if groundings.shape.as_slice() != rewriter.variables().varseq() {
        return Err(Error::ShapeMismatch);
    }

    Ok(instantiate_checked(rewriter, groundings))
}

/// Rewrites every term in `terms`: this is `extract_groundings`
/// followed by `instantiate_groundings`.
pub fn lower_map<G: Scope>(rewriter: &Rewriter, terms: &Collection<G, Term>) -> Collection<G, Term>
where
    G::Timestamp: Lattice + Ord,
{
    let groundings = extract_groundings(rewriter, terms);

    tracing::debug!(
        variables = groundings.shape.len(),
        implication = rewriter.rewrite_target().is_some(),
        "lowered rewriter to dataflow"
    );
    instantiate_checked(rewriter, &groundings)
}

/// The caller has already compared shapes.
fn instantiate_checked<G: Scope>(
    rewriter: &Rewriter,
    groundings: &GroundingCollection<G>,
) -> Collection<G, Term>
where
    G::Timestamp: Lattice + Ord,
{
    let rewriter = rewriter.clone();

    groundings
        .container
        .flat_map(move |grounding| rewriter.instantiate(&grounding))
}

#[cfg(test)]
use crate::ground::types::{IMPLICATION_SCOPE_LINK, LAMBDA_LINK, VARIABLE_LIST};

#[cfg(test)]
fn rewriter(scope: Term, rewrite: Option<&Term>) -> Rewriter {
    use crate::ground::TypeHierarchy;
    use crate::unification::ScopeLink;

    let hierarchy = TypeHierarchy::standard();
    let scope = ScopeLink::new(&scope, &hierarchy).expect("ok");

    Rewriter::new(&scope, rewrite, &hierarchy)
}

#[cfg(test)]
fn f_to_g() -> Rewriter {
    let x = Term::variable("$x");
    let target = Term::link("g", vec![x.clone()]);

    rewriter(
        Term::link(
            IMPLICATION_SCOPE_LINK,
            vec![x.clone(), Term::link("f", vec![x.clone()]), target.clone()],
        ),
        Some(&target),
    )
}

#[test]
fn test_lower_map_happy_path() {
    use super::TermSink;
    use differential_dataflow::input::InputSession;
    use std::collections::HashSet;

    let rewriter = f_to_g();
    let sink = TermSink::new();
    let writer = sink.writer();

    timely::execute::example(move |scope| {
        let mut terms = InputSession::new();

        let results = lower_map(&rewriter, &terms.to_collection(scope));
        writer.attach(&results);

        terms.advance_to(0);
        for i in 1..10 {
            let tag = if (i % 2) == 0 { "f" } else { "h" };
            terms.insert(Term::link(tag, vec![Term::number(i)]));
        }

        terms.flush();
        terms.advance_to(1);
    });

    assert_eq!(
        sink.values::<HashSet<_>>(),
        [2, 4, 6, 8]
            .iter()
            .map(|i| Term::link("g", vec![Term::number(*i)]))
            .collect()
    );
}

#[test]
fn test_lower_map_retraction() {
    use super::TermSink;
    use differential_dataflow::input::InputSession;

    let rewriter = f_to_g();
    let sink = TermSink::new();
    let writer = sink.writer();

    timely::execute::example(move |scope| {
        let mut terms = InputSession::new();

        writer.attach(&lower_map(&rewriter, &terms.to_collection(scope)));

        terms.advance_to(0);
        terms.insert(Term::link("f", vec![Term::number(1)]));
        terms.insert(Term::link("f", vec![Term::number(2)]));
        terms.flush();
        terms.advance_to(1);
        terms.remove(Term::link("f", vec![Term::number(1)]));
        terms.insert(Term::link("f", vec![Term::number(2)]));
        terms.flush();
        terms.advance_to(2);
    });

    assert_eq!(
        sink.with_snapshot(|map| map.clone()),
        [(Term::link("g", vec![Term::number(2)]), 2)]
            .iter()
            .cloned()
            .collect()
    );
}

#[test]
fn test_extract_then_instantiate() {
    use super::{GroundingSink, TermSink};
    use crate::unification::Grounding;
    use differential_dataflow::input::InputSession;
    use std::collections::HashSet;

    let x = Term::variable("$x");
    let y = Term::variable("$y");
    let rewriter = rewriter(
        Term::link(
            LAMBDA_LINK,
            vec![
                Term::link(VARIABLE_LIST, vec![x.clone(), y.clone()]),
                Term::link("pair", vec![x.clone(), y.clone()]),
            ],
        ),
        None,
    );

    let grounding_sink = GroundingSink::new();
    let grounding_writer = grounding_sink.writer();
    let term_sink = TermSink::new();
    let term_writer = term_sink.writer();

    timely::execute::example(move |scope| {
        let mut terms = InputSession::new();

        let groundings = extract_groundings(&rewriter, &terms.to_collection(scope));
        assert_eq!(groundings.shape, vec![x.clone(), y.clone()]);
        grounding_writer.attach(&groundings.container);

        let results = instantiate_groundings(&rewriter, &groundings).expect("ok");
        term_writer.attach(&results);

        terms.advance_to(0);
        terms.insert(Term::link("pair", vec![Term::number(1), Term::number(2)]));
        terms.insert(Term::link("pair", vec![Term::number(3)]));
        terms.flush();
        terms.advance_to(1);
    });

    assert_eq!(
        grounding_sink.values::<HashSet<_>>(),
        [Grounding::from(vec![Some(Term::number(1)), Some(Term::number(2))])]
            .iter()
            .cloned()
            .collect()
    );
    assert_eq!(
        term_sink.values::<HashSet<_>>(),
        [Term::list(vec![Term::number(1), Term::number(2)])]
            .iter()
            .cloned()
            .collect()
    );
}

#[test]
fn test_instantiate_shape_mismatch() {
    use differential_dataflow::input::InputSession;

    let lambda = rewriter(
        Term::link(
            LAMBDA_LINK,
            vec![
                Term::variable("$y"),
                Term::link("f", vec![Term::variable("$y")]),
            ],
        ),
        None,
    );
    let implication = f_to_g();

    timely::execute::example(move |scope| {
        let mut terms = InputSession::new();

        let groundings = extract_groundings(&lambda, &terms.to_collection(scope));
        assert_eq!(
            instantiate_groundings(&implication, &groundings).err(),
            Some(Error::ShapeMismatch)
        );
        assert!(instantiate_groundings(&lambda, &groundings).is_ok());

        terms.advance_to(0);
        terms.flush();
    });
}
