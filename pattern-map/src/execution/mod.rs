//! The execution layer bridges the narrow gap between our rewriters
//! and differential dataflow's collections.
mod lower_map;
mod sink;
mod split_container;

pub use lower_map::extract_groundings;
pub use lower_map::instantiate_groundings;
pub use lower_map::lower_map;
pub use sink::GroundingSink;
pub use sink::GroundingWriter;
pub use sink::Sink;
pub use sink::SinkWriter;
pub use sink::TermSink;
pub use sink::TermWriter;
pub use split_container::GroundingCollection;
pub use split_container::SplitCollection;
pub use split_container::SplitContainer;
