//! Mapping a declaration over ground terms never needs full
//! unification: we only ever match a pattern against a fully ground
//! term, or fully instantiate a template with a grounding.  Matching
//! accepts a ground term, and returns a `Grounding` (one value per
//! declared variable) on success.  Instantiation accepts the values
//! of a grounding, and returns a new term.
//!
//! The usual split between static shape and dynamic data pervades
//! our implementations of matching and instantiation.  The pattern
//! and the rewrite target are functions of the declaration, but not
//! of the data; it makes sense to front-load as much work as possible
//! (including all type hierarchy lookups) before traversing
//! collections.
mod grounding;
mod pattern;
mod scope;
mod template;
mod variables;

pub use grounding::Grounding;
pub use pattern::Pattern;
pub use scope::free_variables;
pub use scope::ScopeLink;
pub use template::Template;
pub use variables::TypePredicate;
pub use variables::Variables;
