//! The token filter: match cycle, replacement drain, and read surface.
//!
//! Overview
//! - [`TokenFilter`] pulls characters from a wrapped [`CharSource`] and
//!   rewrites delimited tokens on the fly. Output is produced strictly on
//!   demand, one character per [`read`](TokenFilter::read) call, so the
//!   filter adds no blocking behavior beyond the source's own.
//! - Each top-level match cycle is transactional: a mark is placed before
//!   any hypothesis is tried, and all lookahead is contained within that
//!   cycle's mark/reset pair. There is no backtracking across cycles.
//!
//! Buffers
//! - `input: Lookahead` wraps the source and gives the matcher mark/reset/
//!   commit over a bounded run of peeked characters.
//! - `replacement: VecDeque<char>` holds the output of a classified token
//!   (resolved value or literal fallback) and is drained from the front
//!   before any matching resumes. It is never refilled while non-empty.
//!
//! Guarantees per `read`
//! - If the replacement buffer is non-empty, its front character is served.
//! - Otherwise one match cycle runs: escape attempt, then delimiter begin
//!   attempt (longest full match wins, first of a given length on ties),
//!   then either literal emission or a committed scan for the end token,
//!   resolution, and a refill of the replacement buffer.
//! - Once the source reports end of stream the condition is latched: after
//!   any pending replacement drains, every further read returns `None`.
//!
//! The "try again" paths (an escaped token, consecutive unresolved tokens)
//! are iterative, via the cycle loop in `read`, never recursive, so stack
//! usage stays flat on adversarial input.

mod lookahead;


use alloc::{
    collections::VecDeque,
    string::{String, ToString},
    vec::Vec,
};

use lookahead::Lookahead;

use crate::{
    delimiter::{DelimiterSet, DelimiterSpec},
    error::{ConfigError, FilterError},
    options::FilterOptions,
    resolver::{RecursionGuard, Resolver},
    source::CharSource,
};

type ReadError<S, R> = FilterError<<S as CharSource>::Error, <R as Resolver>::Error>;

/// A streaming substitution filter over a character source.
///
/// See the [crate docs](crate) for an overview and the configuration surface
/// below for the individual knobs. The filter exclusively owns its source;
/// dropping the filter drops the source, and [`into_inner`] releases it.
///
/// [`into_inner`]: TokenFilter::into_inner
pub struct TokenFilter<S: CharSource, R: Resolver> {
    input: Lookahead<S>,
    resolver: R,
    guard: RecursionGuard,
    delimiters: DelimiterSet,
    options: FilterOptions,
    replacement: VecDeque<char>,
    eof: bool,
}

impl<S: CharSource, R: Resolver> TokenFilter<S, R> {
    /// Creates a filter with the default options and the default `${` … `}`
    /// delimiter pair.
    pub fn new(source: S, resolver: R) -> Self {
        Self::with_options(source, resolver, FilterOptions::default())
    }

    /// Creates a filter with explicit options.
    pub fn with_options(source: S, resolver: R, options: FilterOptions) -> Self {
        let delimiters = DelimiterSet::new();
        let escape_len = options
            .escape
            .as_deref()
            .map_or(0, |e| e.chars().count());
        let bound = delimiters.lookahead_bound(escape_len);
        Self {
            input: Lookahead::new(source, bound),
            resolver,
            guard: RecursionGuard::new(),
            delimiters,
            options,
            replacement: VecDeque::new(),
            eof: false,
        }
    }

    // --- Configuration surface --------------------------------------------

    /// Registers a delimiter spec in textual `"begin*end"` form.
    pub fn register_delimiter_spec(&mut self, spec: &str) -> Result<(), ConfigError> {
        self.delimiters.register(DelimiterSpec::parse(spec)?);
        self.recompute_bound();
        Ok(())
    }

    /// Removes a delimiter spec given in textual form, reporting whether it
    /// was registered.
    pub fn remove_delimiter_spec(&mut self, spec: &str) -> Result<bool, ConfigError> {
        let removed = self.delimiters.remove(&DelimiterSpec::parse(spec)?);
        self.recompute_bound();
        Ok(removed)
    }

    /// Replaces the whole delimiter set with the given textual specs. The
    /// existing set, default pair included, is cleared first.
    pub fn set_delimiter_specs<'a>(
        &mut self,
        specs: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), ConfigError> {
        let parsed = specs
            .into_iter()
            .map(DelimiterSpec::parse)
            .collect::<Result<Vec<_>, _>>()?;
        self.delimiters.replace_all(parsed);
        self.recompute_bound();
        Ok(())
    }

    /// Sets the escape string. An empty string disables escaping.
    pub fn set_escape_string(&mut self, escape: &str) {
        self.options.escape = if escape.is_empty() {
            None
        } else {
            Some(escape.to_string())
        };
        self.recompute_bound();
    }

    /// Sets whether a matched escape string is kept in the output.
    pub fn set_preserve_escape(&mut self, preserve: bool) {
        self.options.preserve_escape = preserve;
    }

    /// Sets whether tokens may span line boundaries.
    pub fn set_multi_line(&mut self, multi_line: bool) {
        self.options.multi_line = multi_line;
    }

    /// Sets the resolver call convention flag.
    pub fn set_prefix_pattern(&mut self, prefix_pattern: bool) {
        self.options.prefix_pattern = prefix_pattern;
    }

    /// Injects a recursion guard, replacing the filter's current one.
    pub fn set_recursion_guard(&mut self, guard: RecursionGuard) {
        self.guard = guard;
    }

    /// The active options.
    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// The registered delimiter specs.
    pub fn delimiters(&self) -> &DelimiterSet {
        &self.delimiters
    }

    /// The resolver this filter consults.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Releases the wrapped source.
    pub fn into_inner(self) -> S {
        self.input.into_inner()
    }

    fn recompute_bound(&mut self) {
        let escape_len = self
            .options
            .escape
            .as_deref()
            .map_or(0, |e| e.chars().count());
        self.input
            .set_bound(self.delimiters.lookahead_bound(escape_len));
    }

    // --- Read surface -----------------------------------------------------

    /// Returns the next character of the filtered stream, or `None` once the
    /// underlying source is exhausted and all pending output has drained.
    ///
    /// # Errors
    ///
    /// [`FilterError::Source`] on an underlying source failure and
    /// [`FilterError::Resolution`] when the resolver fails for a terminated
    /// token. Unterminated tokens are not errors; they pass through as
    /// literal text.
    pub fn read(&mut self) -> Result<Option<char>, ReadError<S, R>> {
        loop {
            if let Some(ch) = self.replacement.pop_front() {
                return Ok(Some(ch));
            }
            if self.eof {
                return Ok(None);
            }
            self.match_cycle()?;
        }
    }

    /// Reads up to `buf.len()` characters into `buf`, returning the number
    /// stored. `0` means end of stream (or an empty `buf`).
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub fn read_chars(&mut self, buf: &mut [char]) -> Result<usize, ReadError<S, R>> {
        let mut count = 0;
        while count < buf.len() {
            match self.read()? {
                Some(ch) => {
                    buf[count] = ch;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }

    /// Skips up to `n` characters of filtered output, returning the number
    /// actually skipped.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub fn skip(&mut self, n: usize) -> Result<usize, ReadError<S, R>> {
        for skipped in 0..n {
            if self.read()?.is_none() {
                return Ok(skipped);
            }
        }
        Ok(n)
    }

    /// Drains the remaining filtered output into a `String`.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub fn read_to_string(&mut self) -> Result<String, ReadError<S, R>> {
        let mut out = String::new();
        while let Some(ch) = self.read()? {
            out.push(ch);
        }
        Ok(out)
    }

    // --- Match cycle ------------------------------------------------------

    /// Runs one top-level match cycle: refills the replacement buffer or
    /// latches end of stream.
    fn match_cycle(&mut self) -> Result<(), ReadError<S, R>> {
        self.input.mark();
        let Some(first) = self.input.read().map_err(FilterError::Source)? else {
            self.input.commit();
            self.eof = true;
            return Ok(());
        };

        let multi_line = self.options.multi_line;
        if first == '\n' && !multi_line {
            // No token can start on this side of the newline.
            self.input.commit();
            self.replacement.push_back('\n');
            return Ok(());
        }

        // Escape attempt. On a full match the cycle is pinned past the
        // escape text; on any mismatch the delimiter attempt restarts at the
        // mark as if no escape had been tried.
        let escape = self.options.escape.as_deref().filter(|e| !e.is_empty());
        let mut escaped = false;
        if let Some(esc) = escape {
            if esc.chars().next() == Some(first) {
                escaped = match_literal(&mut self.input, &esc[first.len_utf8()..], multi_line)
                    .map_err(FilterError::Source)?;
            }
        }
        let prefix = if escaped {
            escape.map_or(0, |e| e.chars().count())
        } else {
            0
        };

        // Delimiter begin attempt. Only begin-token lengths are compared: a
        // later spec overwrites the candidate only when its begin token is
        // strictly longer, so the first full match of a given length wins.
        // Two begin tokens diverging after a shared prefix can therefore
        // select the longer spec without re-verifying the shorter one; this
        // mirrors the longstanding behavior of the format being replicated.
        let mut candidate: Option<DelimiterSpec> = None;
        let mut best_len = 0usize;
        for spec in self.delimiters.iter() {
            let len = spec.begin().chars().count();
            if len <= best_len {
                continue;
            }
            self.input.reset();
            self.input.skip_peeked(prefix);
            if match_literal(&mut self.input, spec.begin(), multi_line)
                .map_err(FilterError::Source)?
            {
                best_len = len;
                candidate = Some(spec.clone());
            }
        }
        self.input.reset();
        self.input.skip_peeked(prefix);

        if escaped {
            // The escape settles the very next character as literal. When a
            // begin token follows, the escape text itself is dropped unless
            // configured otherwise; an escape before plain text is kept.
            if candidate.is_none() || self.options.preserve_escape {
                if let Some(esc) = escape {
                    self.replacement.extend(esc.chars());
                }
            }
            match self.input.read().map_err(FilterError::Source)? {
                Some(ch) => self.replacement.push_back(ch),
                None => self.eof = true,
            }
            self.input.commit();
            return Ok(());
        }

        let Some(spec) = candidate else {
            // No token starts here: emit exactly one literal character.
            self.input.skip_peeked(1);
            self.input.commit();
            self.replacement.push_back(first);
            return Ok(());
        };

        self.scan_committed(&spec)
    }

    /// Scans past the selected begin token for the end token, then resolves
    /// and refills the replacement buffer.
    ///
    /// On entry the cursor sits at the begin token, which was fully peeked
    /// during candidate selection.
    fn scan_committed(&mut self, spec: &DelimiterSpec) -> Result<(), ReadError<S, R>> {
        self.input.skip_peeked(spec.begin().chars().count());
        // Lookahead is settled; key collection needs no rewind and may grow
        // past the mark bound.
        self.input.commit();

        let mut span = String::from(spec.begin());
        let end: Vec<char> = spec.end().chars().collect();
        let mut matched = 0usize;
        let mut terminated = false;

        loop {
            match self.input.read().map_err(FilterError::Source)? {
                None => {
                    self.eof = true;
                    break;
                }
                Some('\n') if !self.options.multi_line => {
                    // Unterminated on this line; the newline passes through
                    // with the rest of the span.
                    span.push('\n');
                    break;
                }
                Some(ch) => {
                    span.push(ch);
                    if ch == end[matched] {
                        matched += 1;
                        if matched == end.len() {
                            terminated = true;
                            break;
                        }
                    } else {
                        // Restart the countdown; the mismatching character
                        // may itself open the end token.
                        matched = usize::from(ch == end[0]);
                    }
                }
            }
        }

        if !terminated {
            // Not an error: the accumulated span goes out verbatim.
            self.replacement.extend(span.chars());
            return Ok(());
        }

        let key = &span[spec.begin().len()..span.len() - spec.end().len()];
        let resolved = self
            .resolver
            .resolve(key, self.options.prefix_pattern, &mut self.guard)
            .map_err(|error| FilterError::Resolution {
                key: key.to_string(),
                error,
            })?;

        match resolved {
            Some(value) => self.replacement.extend(value.chars()),
            None => self.replacement.extend(span.chars()),
        }
        Ok(())
    }
}

/// Matches `expected` character by character against the upcoming input.
/// Any mismatch, end of stream, or disallowed newline abandons the attempt.
fn match_literal<S: CharSource>(
    input: &mut Lookahead<S>,
    expected: &str,
    multi_line: bool,
) -> Result<bool, S::Error> {
    for want in expected.chars() {
        match input.read()? {
            Some(ch) if ch == want && (multi_line || ch != '\n') => {}
            _ => return Ok(false),
        }
    }
    Ok(true)
}

impl<S: CharSource, R: Resolver> CharSource for TokenFilter<S, R> {
    type Error = ReadError<S, R>;

    fn next_char(&mut self) -> Result<Option<char>, Self::Error> {
        self.read()
    }
}
