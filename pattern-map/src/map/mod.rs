//! The map layer lifts single-term rewriting to collections of ground
//! terms.  `Rewriter` handles one term; `MapLink` validates a
//! declaration, then dispatches on the shape of its input.
mod map_link;
mod rewriter;
mod shape;

pub use map_link::MapLink;
pub use rewriter::Rewriter;
pub use shape::CollectionShape;

use crate::ground::Term;

/// Some inputs must be evaluated (e.g., executed) before they can be
/// mapped over.  Evaluation is not our concern: callers that need it
/// inject an `Evaluate` hook, which runs on the input before shape
/// dispatch.  Closures of the right shape are evaluators.
pub trait Evaluate: Send + Sync {
    fn evaluate(&self, term: &Term) -> Term;
}

impl<F> Evaluate for F
where
    F: Fn(&Term) -> Term + Send + Sync,
{
    #[inline]
    fn evaluate(&self, term: &Term) -> Term {
        self(term)
    }
}
