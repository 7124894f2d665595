//! Error types for configuration and the read path.

use alloc::string::String;
use thiserror::Error;

/// Configuration errors.
///
/// These are raised synchronously by the configuration call that introduced
/// them and are never deferred into a later read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A textual delimiter spec had no `*` separator between its halves.
    #[error("delimiter spec '{spec}' has no '*' separator")]
    MissingSeparator {
        /// The rejected spec text.
        spec: String,
    },
    /// A delimiter spec had an empty begin or end token.
    #[error("delimiter spec '{spec}' has an empty begin or end token")]
    EmptyDelimiter {
        /// The rejected spec text.
        spec: String,
    },
}

/// Errors surfaced by the read path of a filter.
///
/// `S` is the wrapped source's error type and `R` the resolver's. Everything
/// else that can go wrong during matching (unterminated tokens, failed
/// escape or delimiter matches) degrades to literal pass-through and is not
/// an error.
#[derive(Error, Debug, PartialEq)]
pub enum FilterError<S, R> {
    /// Underlying source failure, propagated unchanged.
    #[error("source error: {0}")]
    Source(S),
    /// The resolver failed for the key of a fully terminated token. Fatal
    /// for the in-progress read; not retried.
    #[error("cannot resolve expression '{key}': {error}")]
    Resolution {
        /// The key whose resolution failed.
        key: String,
        /// The resolver's error.
        error: R,
    },
}
