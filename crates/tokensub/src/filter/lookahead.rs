//! Transactional pushback buffer over a character source.
//!
//! The matcher needs to try hypotheses ("an escape string starts here", "the
//! begin token of spec N starts here") and abandon them without losing
//! input. [`Lookahead`] gives it that as a small deque of peeked characters
//! plus a cursor, rather than relying on any particular reader type's
//! mark/reset semantics:
//!
//! - [`mark`](Lookahead::mark) commits everything consumed so far and places
//!   a mark at the current position;
//! - [`reset`](Lookahead::reset) rewinds the cursor to the mark, as often as
//!   needed while the mark is live (one rewind per match attempt);
//! - [`commit`](Lookahead::commit) discards the consumed prefix along with
//!   the mark;
//! - [`skip_peeked`](Lookahead::skip_peeked) advances past characters that
//!   were already pulled into the deque, without touching the source.
//!
//! While a mark is live the deque may not grow past the configured bound.
//! The bound is computed from the registered delimiters and escape string,
//! so exceeding it means the bound was miscomputed: a programming error,
//! and a panic rather than a recoverable condition.
//!
//! Source end-of-stream is latched here: after the first `None` the source
//! is never read again.

use alloc::collections::VecDeque;

use crate::source::CharSource;

#[derive(Debug)]
pub(crate) struct Lookahead<S> {
    source: S,
    /// Characters pulled from the source but not yet committed.
    pending: VecDeque<char>,
    /// Index into `pending` of the next character to serve.
    cursor: usize,
    /// Whether a mark is live at index 0 of `pending`.
    marked: bool,
    /// Maximum `pending` length while marked.
    bound: usize,
    eof: bool,
}

impl<S: CharSource> Lookahead<S> {
    pub(crate) fn new(source: S, bound: usize) -> Self {
        Self {
            source,
            pending: VecDeque::new(),
            cursor: 0,
            marked: false,
            bound,
            eof: false,
        }
    }

    pub(crate) fn set_bound(&mut self, bound: usize) {
        self.bound = bound;
    }

    /// Releases the wrapped source.
    pub(crate) fn into_inner(self) -> S {
        self.source
    }

    /// Commits everything consumed so far and marks the current position.
    pub(crate) fn mark(&mut self) {
        self.pending.drain(..self.cursor);
        self.cursor = 0;
        self.marked = true;
    }

    /// Rewinds to the mark. Valid until the next `mark` or `commit`.
    pub(crate) fn reset(&mut self) {
        debug_assert!(self.marked, "reset without a live mark");
        self.cursor = 0;
    }

    /// Discards the consumed prefix and the mark.
    pub(crate) fn commit(&mut self) {
        self.pending.drain(..self.cursor);
        self.cursor = 0;
        self.marked = false;
    }

    /// Serves the next character, pulling from the source once the peeked
    /// run is exhausted.
    pub(crate) fn read(&mut self) -> Result<Option<char>, S::Error> {
        if let Some(&ch) = self.pending.get(self.cursor) {
            self.cursor += 1;
            return Ok(Some(ch));
        }
        if self.eof {
            return Ok(None);
        }
        match self.source.next_char()? {
            Some(ch) => {
                if self.marked {
                    assert!(
                        self.pending.len() < self.bound,
                        "lookahead bound exceeded: {} characters peeked with bound {}",
                        self.pending.len(),
                        self.bound,
                    );
                    self.pending.push_back(ch);
                    self.cursor += 1;
                }
                // Unmarked reads have nothing to rewind to; serve directly.
                Ok(Some(ch))
            }
            None => {
                self.eof = true;
                Ok(None)
            }
        }
    }

    /// Advances past `n` already-peeked characters without re-reading them
    /// from the source.
    pub(crate) fn skip_peeked(&mut self, n: usize) {
        debug_assert!(
            self.cursor + n <= self.pending.len(),
            "skip_peeked past the peeked run"
        );
        self.cursor = (self.cursor + n).min(self.pending.len());
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;
    use crate::source::StrSource;

    fn lookahead(text: &str) -> Lookahead<StrSource<'_>> {
        Lookahead::new(StrSource::new(text), 16)
    }

    fn read(la: &mut Lookahead<StrSource<'_>>) -> Option<char> {
        la.read().unwrap()
    }

    #[test]
    fn reset_replays_peeked_characters() {
        let mut la = lookahead("abc");
        la.mark();
        assert_eq!(read(&mut la), Some('a'));
        assert_eq!(read(&mut la), Some('b'));
        la.reset();
        assert_eq!(read(&mut la), Some('a'));
        assert_eq!(read(&mut la), Some('b'));
        assert_eq!(read(&mut la), Some('c'));
    }

    #[test]
    fn reset_is_repeatable_while_marked() {
        let mut la = lookahead("xy");
        la.mark();
        assert_eq!(read(&mut la), Some('x'));
        la.reset();
        assert_eq!(read(&mut la), Some('x'));
        la.reset();
        assert_eq!(read(&mut la), Some('x'));
    }

    #[test]
    fn commit_drops_prefix_and_serves_leftovers() {
        let mut la = lookahead("abcd");
        la.mark();
        assert_eq!(read(&mut la), Some('a'));
        assert_eq!(read(&mut la), Some('b'));
        la.reset();
        la.skip_peeked(1);
        la.commit();
        // 'b' was peeked but not consumed; it must come back before 'c'.
        assert_eq!(read(&mut la), Some('b'));
        assert_eq!(read(&mut la), Some('c'));
        assert_eq!(read(&mut la), Some('d'));
        assert_eq!(read(&mut la), None);
    }

    #[test]
    fn mark_after_reset_rebases() {
        let mut la = lookahead("abc");
        la.mark();
        assert_eq!(read(&mut la), Some('a'));
        la.reset();
        la.skip_peeked(1);
        la.mark();
        assert_eq!(read(&mut la), Some('b'));
        la.reset();
        assert_eq!(read(&mut la), Some('b'));
    }

    #[test]
    fn eof_is_latched() {
        let mut la = lookahead("a");
        assert_eq!(read(&mut la), Some('a'));
        assert_eq!(read(&mut la), None);
        assert_eq!(read(&mut la), None);
    }

    #[test]
    fn eof_inside_mark_still_replays() {
        let mut la = lookahead("a");
        la.mark();
        assert_eq!(read(&mut la), Some('a'));
        assert_eq!(read(&mut la), None);
        la.reset();
        assert_eq!(read(&mut la), Some('a'));
        assert_eq!(read(&mut la), None);
    }

    #[test]
    #[should_panic(expected = "lookahead bound exceeded")]
    fn exceeding_the_bound_panics() {
        let text: String = core::iter::repeat_n('x', 32).collect();
        let mut la = Lookahead::new(StrSource::new(&text), 4);
        la.mark();
        for _ in 0..8 {
            let _ = la.read().unwrap();
        }
    }
}
