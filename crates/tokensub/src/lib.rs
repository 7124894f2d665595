//! A streaming, single-pass token substitution filter.
//!
//! [`TokenFilter`] wraps a forward-only character source and rewrites
//! delimited tokens (`${key}` by default) as it streams: each token's key is
//! handed to a pluggable [`Resolver`], and the resolved value replaces the
//! token in the output. Unresolvable tokens pass through exactly as written,
//! so filtering is lossless on anything it does not understand.
//!
//! The filter supports multiple simultaneous delimiter pairs with a
//! longest-match policy, an escape sequence that suppresses substitution of
//! the next token, and an optional single-line mode in which tokens may not
//! span newlines. Output is pulled one character at a time, so filters
//! compose into pipelines: [`TokenFilter`] itself implements [`CharSource`].
//!
//! ```
//! use tokensub::{MapResolver, StrSource, TokenFilter};
//!
//! let mut values = MapResolver::new();
//! values.insert("name", "World");
//!
//! let mut filter = TokenFilter::new(StrSource::new("Hello ${name}!"), values);
//! assert_eq!(filter.read_to_string().unwrap(), "Hello World!");
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod delimiter;
mod error;
mod filter;
mod options;
mod resolver;
mod source;

pub use delimiter::{DelimiterSet, DelimiterSpec};
pub use error::{ConfigError, FilterError};
pub use filter::TokenFilter;
pub use options::FilterOptions;
pub use resolver::{MapResolver, RecursionGuard, Resolver};
pub use source::{CharSource, StrSource};
