//! Character sources consumed by the filter.

use core::convert::Infallible;

/// A forward-only source of characters.
///
/// End of stream is signalled by `Ok(None)`. The signal is one-shot from the
/// filter's point of view: [`TokenFilter`](crate::TokenFilter) latches the
/// first `None` and never reads the source again, so implementations do not
/// have to make their own end-of-stream sticky.
pub trait CharSource {
    /// Error reported by the underlying input.
    type Error;

    /// Pulls the next character, or `None` at end of stream.
    fn next_char(&mut self) -> Result<Option<char>, Self::Error>;
}

/// Adapts a string slice to [`CharSource`].
///
/// Reading from a string cannot fail, so the error type is [`Infallible`].
#[derive(Debug, Clone)]
pub struct StrSource<'a> {
    chars: core::str::Chars<'a>,
}

impl<'a> StrSource<'a> {
    /// Creates a source over `text`.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars(),
        }
    }
}

impl CharSource for StrSource<'_> {
    type Error = Infallible;

    fn next_char(&mut self) -> Result<Option<char>, Infallible> {
        Ok(self.chars.next())
    }
}
