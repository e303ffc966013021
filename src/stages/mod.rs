//! Transform stages
//!
//! Each stage owns its parent and redefines `materialize` in terms of the
//! parent's. Construct them through the [`Stream`](crate::Stream) adapters.

mod filter;
mod flatten;
mod map;
mod reverse;

pub use filter::Filter;
pub use flatten::Flatten;
pub use map::Map;
pub use reverse::Reverse;
