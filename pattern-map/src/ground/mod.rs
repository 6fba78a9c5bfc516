//! Ground data is made of typed trees.  The matcher only ever asks a
//! handful of questions about a term (its type tag, whether it is a
//! link, and its ordered outgoing terms), and only ever builds new
//! terms from a tag and a list of outgoing terms.  Everything else
//! about storage (interning, hashing strategy, lifetime) stays out of
//! this crate's concerns: terms are plain reference-counted values.
//!
//! The subtype relation between tags lives in a separate
//! `TypeHierarchy`, which we only consult when compiling
//! declarations.

mod term;
pub mod types;

pub use term::Term;
pub use types::Type;
pub use types::TypeHierarchy;
