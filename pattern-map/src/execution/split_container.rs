//! Groundings are only meaningful next to the list of variables they
//! ground.  Rather than tag each grounding with its variables, we
//! track that shape once per collection: split collections are simple
//! wrappers around differential dataflow Collections, tagged with the
//! shape of all their constituent items.  This static / dynamic split
//! lets us check compatibility as we construct the dataflow graph,
//! rather than once per item.
use crate::ground::Term;
use crate::unification::Grounding;
use differential_dataflow::collection::Collection;

/// A `GroundingCollection` is a `Collection` of `Grounding`s, all for
/// the same list of variables.
pub type GroundingCollection<G, R = isize> = SplitCollection<G, Vec<Term>, Grounding, R>;

/// A `SplitCollection` is a shape-tagged DD `Collection`.
pub type SplitCollection<G, S, D, R = isize> = SplitContainer<S, Collection<G, D, R>>;

pub struct SplitContainer<Shape, Container> {
    pub shape: Shape,
    pub container: Container,
}

impl<Shape, Container> SplitContainer<Shape, Container> {
    #[must_use]
    pub fn new(shape: Shape, container: Container) -> Self {
        Self { shape, container }
    }
}
