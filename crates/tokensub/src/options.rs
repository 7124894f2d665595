//! Filter configuration options.

use alloc::string::String;

/// Configuration for [`TokenFilter`](crate::TokenFilter).
///
/// Options may be changed between reads via the filter's setters; changing
/// them mid-token (while a replacement is draining) is not supported.
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Escape string that suppresses substitution of the next token.
    ///
    /// When the escape text appears immediately before a begin token, that
    /// token is passed through as literal text instead of being resolved.
    /// `None` disables escaping entirely.
    ///
    /// # Default
    ///
    /// `None`
    pub escape: Option<String>,

    /// Whether a matched escape string is kept in the output.
    ///
    /// With `false`, `\${foo}` becomes `${foo}`; with `true` it stays
    /// `\${foo}` (for an escape string of `\`).
    ///
    /// # Default
    ///
    /// `false`
    pub preserve_escape: bool,

    /// Whether a token may span line boundaries.
    ///
    /// When `false`, a newline aborts any in-progress match: the scanned text
    /// is emitted verbatim, the newline included, and matching resumes on the
    /// next line.
    ///
    /// # Default
    ///
    /// `true`
    pub multi_line: bool,

    /// Resolver call convention: whether [`Resolver::resolve`] is invoked
    /// with the extra empty-prefix argument set.
    ///
    /// [`Resolver::resolve`]: crate::Resolver::resolve
    ///
    /// # Default
    ///
    /// `true`
    pub prefix_pattern: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            escape: None,
            preserve_escape: false,
            multi_line: true,
            prefix_pattern: true,
        }
    }
}
