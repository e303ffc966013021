//! Parallelism configuration for terminal operations.
//!
//! Every terminal operation that can fan out takes `impl Into<Parallelism>`, so
//! a plain integer works the way a thread count would: `0` is serial, `k > 0`
//! materializes with `k` worker threads.

use crate::error::{Error, Result};

/// Environment variable holding the default worker count.
pub const THREADS_ENV: &str = "LAZY_STREAMS_THREADS";
/// Environment variable holding the default in-flight requests per worker.
pub const LOOKAHEAD_ENV: &str = "LAZY_STREAMS_LOOKAHEAD";

const DEFAULT_LOOKAHEAD: usize = 2;

/// How a terminal operation materializes its stream.
///
/// ```rust
/// use lazy_streams::Parallelism;
///
/// assert!(!Parallelism::from(0).is_parallel());
///
/// let p = Parallelism::threads(4).with_lookahead(3);
/// assert_eq!(p.thread_count(), 4);
/// assert_eq!(p.max_in_flight(), 12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Parallelism {
    threads: usize,
    lookahead: usize,
}

impl Parallelism {
    /// Materialize on the calling thread.
    pub const SERIAL: Parallelism = Parallelism {
        threads: 0,
        lookahead: DEFAULT_LOOKAHEAD,
    };

    /// Materialize with `threads` workers; `0` is serial.
    pub const fn threads(threads: usize) -> Self {
        Parallelism {
            threads,
            lookahead: DEFAULT_LOOKAHEAD,
        }
    }

    /// Number of requests each worker may have queued ahead of the settled
    /// frontier. Clamped to at least one.
    pub const fn with_lookahead(self, lookahead: usize) -> Self {
        Parallelism {
            threads: self.threads,
            lookahead: if lookahead == 0 { 1 } else { lookahead },
        }
    }

    /// Whether materialization fans out to worker threads.
    pub const fn is_parallel(&self) -> bool {
        self.threads > 0
    }

    /// Worker threads requested; `0` when serial.
    pub const fn thread_count(&self) -> usize {
        self.threads
    }

    /// Requests per worker allowed in flight; see
    /// [`with_lookahead`](Self::with_lookahead).
    pub const fn lookahead(&self) -> usize {
        self.lookahead
    }

    /// Upper bound on outstanding materialization requests, and therefore on
    /// how far the parallel driver can run past the end of a stream.
    pub const fn max_in_flight(&self) -> usize {
        self.threads * self.lookahead
    }

    /// Reads [`THREADS_ENV`] and [`LOOKAHEAD_ENV`]. Unset variables keep the
    /// serial defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut parallelism = Parallelism::SERIAL;
        if let Some(threads) = parse_var(&lookup, THREADS_ENV)? {
            parallelism = Parallelism::threads(threads);
        }
        if let Some(lookahead) = parse_var(&lookup, LOOKAHEAD_ENV)? {
            parallelism = parallelism.with_lookahead(lookahead);
        }
        Ok(parallelism)
    }
}

fn parse_var<F>(lookup: &F, key: &str) -> Result<Option<usize>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidConfig {
                key: key.to_string(),
                value: raw,
            }),
    }
}

impl Default for Parallelism {
    fn default() -> Self {
        Parallelism::SERIAL
    }
}

impl From<usize> for Parallelism {
    fn from(threads: usize) -> Self {
        Parallelism::threads(threads)
    }
}

/// Integer literals default to `i32`; anything below one is serial.
impl From<i32> for Parallelism {
    fn from(threads: i32) -> Self {
        Parallelism::threads(usize::try_from(threads).unwrap_or(0))
    }
}
