//! # Lazy Streams: Chainable, Lazily Evaluated Sequence Pipelines
//!
//! Build a pipeline of transformations over a finite collection and pay for
//! them only when a terminal operation asks for results.
//!
//! ## Core Types
//!
//! - **[`Stream`]**: The stage contract. Every stage knows its size and can
//!   materialize the item at any position on demand
//! - **[`Materialized<T>`]**: What a stage found at a position: an item, a
//!   filtered-out slot, or the end of the stream
//! - **[`Source<T>`]**: The root stage, backed by a concrete collection
//!
//! ## Key Features
//!
//! - **Composable**: Chain `.map()`, `.filter()`, `.reverse()`, `.flatten()`
//! - **Lazy**: Nothing runs until `.to_list()`, `.reduce()`, `.first()` and friends
//! - **Parallel on request**: Pass a thread count to any full materialization;
//!   output order and content match the serial result
//!
//! ## Example
//!
//! ```
//! use lazy_streams::prelude::*;
//!
//! let s = stream(0..100)
//!     .unwrap()
//!     .reverse()
//!     .filter(|x| (x + 1) % 2 == 0)
//!     .map(|x| x * x)
//!     .map(|x| format!("Item {x}"));
//!
//! assert_eq!(s.last_or_else("Nothing here".to_string()), "Item 1");
//!
//! // same result, materialized by four workers
//! assert_eq!(s.to_list(4), s.to_list(0));
//! ```
//!
//! ## Common Operations
//!
//! **Building pipelines:**
//! - [`stream(items)`](stream) - Start a pipeline from any finite collection
//! - [`map(f)`](Stream::map), [`filter(p)`](Stream::filter),
//!   [`reverse()`](Stream::reverse), [`flatten()`](Stream::flatten)
//!
//! **Terminal operations:**
//! - [`to_list`](Stream::to_list), [`to_string`](Stream::to_string),
//!   [`reduce`](Stream::reduce), [`fold`](Stream::fold)
//! - [`min`](Stream::min), [`max`](Stream::max), [`sort`](Stream::sort),
//!   [`sort_by_key`](Stream::sort_by_key)
//! - [`take`](Stream::take), [`first_or_else`](Stream::first_or_else),
//!   [`last_or_else`](Stream::last_or_else), [`for_each`](Stream::for_each)

pub mod concurrent;
mod config;
mod error;
mod iter;
mod leaves;
mod materialized;
mod pipeline;
pub mod prelude;
mod source;
pub mod stages;

pub use config::{Parallelism, LOOKAHEAD_ENV, THREADS_ENV};
pub use error::{Error, Result};
pub use iter::StreamIter;
pub use leaves::{IntoLeaves, Nested};
pub use materialized::Materialized;
pub use pipeline::{Stream, DEFAULT_SEPARATOR};
pub use source::{stream, MaterializedList, Source};
