//! Typed tree pattern matching: a scope declares variables and a body,
//! the body is matched against ground terms to extract groundings, and
//! the groundings are either returned directly or substituted in a
//! rewrite target.  A `MapLink` does that for every element of a
//! collection; the `execution` module does it incrementally, over
//! differential dataflow collections.
pub mod config;
pub mod error;
pub mod execution;
pub mod ground;
pub mod map;
pub mod unification;

pub use config::MapOptions;
pub use error::{Error, Result};
pub use ground::{Term, Type, TypeHierarchy};
pub use map::{CollectionShape, MapLink, Rewriter};
