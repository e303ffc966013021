//! Errors surfaced to callers.
//!
//! Running past the end of a stream is not an error; it is reported as
//! [`Materialized::Exhausted`](crate::Materialized::Exhausted) and consumed by
//! the terminal operations.

use thiserror::Error;

/// Errors returned by stream construction, configuration and terminal operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The constructor was handed something that is not a finite sequence.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `reduce` was called without a seed on a stream with no items.
    #[error("reduce of empty sequence with no initial value")]
    EmptySequence,

    /// A configuration value could not be parsed.
    #[error("invalid configuration value {value:?} for {key}")]
    InvalidConfig { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            Error::InvalidArgument("unbounded iterator".into()).to_string(),
            "invalid argument: unbounded iterator"
        );
        assert_eq!(
            Error::EmptySequence.to_string(),
            "reduce of empty sequence with no initial value"
        );
        assert_eq!(
            Error::InvalidConfig {
                key: "LAZY_STREAMS_THREADS".into(),
                value: "many".into()
            }
            .to_string(),
            "invalid configuration value \"many\" for LAZY_STREAMS_THREADS"
        );
    }
}
