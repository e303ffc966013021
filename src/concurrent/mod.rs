//! Run materialization requests concurrently
//!
//! This module provides the worker pool and the parallel driver behind
//! terminal operations called with a non-zero parallelism.

mod materializer;
mod promise;

// Re-export the worker pool
pub use promise::{KeeperConfig, Promise, PromiseKeeper};

pub(crate) use materializer::{materialize_parallel, materialize_serial};
