//! Commonly used imports
//!
//! Use `use lazy_streams::prelude::*;` for quick access to the most common types and functions.

// Core types
pub use crate::{Materialized, Parallelism, Stream};

// Entry point and materialized stages
pub use crate::{stream, MaterializedList, Source};

// Nesting for flatten
pub use crate::{nested, IntoLeaves, Nested};

pub use crate::DEFAULT_SEPARATOR;
