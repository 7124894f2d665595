//! Delimiter specs and the registry that drives lookahead sizing.

use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use crate::error::ConfigError;

/// Fixed margin added to the lookahead bound so it never has to be exact,
/// only sufficient.
const MARK_SAFETY_MARGIN: usize = 16;

/// Default begin token.
pub(crate) const DEFAULT_BEGIN: &str = "${";

/// Default end token.
pub(crate) const DEFAULT_END: &str = "}";

/// One registered begin/end token pair defining a substitution syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterSpec {
    begin: String,
    end: String,
}

impl Default for DelimiterSpec {
    /// The default `${` … `}` pair.
    fn default() -> Self {
        Self {
            begin: DEFAULT_BEGIN.to_string(),
            end: DEFAULT_END.to_string(),
        }
    }
}

impl DelimiterSpec {
    /// Creates a spec from its two halves. Either half being empty is a
    /// configuration error.
    pub fn new(begin: &str, end: &str) -> Result<Self, ConfigError> {
        if begin.is_empty() || end.is_empty() {
            let mut spec = String::from(begin);
            spec.push('*');
            spec.push_str(end);
            return Err(ConfigError::EmptyDelimiter { spec });
        }
        Ok(Self {
            begin: begin.to_string(),
            end: end.to_string(),
        })
    }

    /// Parses the textual `"begin*end"` form, e.g. `"${*}"` or `"@{*}"`.
    ///
    /// The parse happens at registration time; a spec with no `*` separator
    /// is rejected here and never reaches the matcher.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let Some((begin, end)) = spec.split_once('*') else {
            return Err(ConfigError::MissingSeparator {
                spec: spec.to_string(),
            });
        };
        Self::new(begin, end)
    }

    /// The literal opening marker.
    #[must_use]
    pub fn begin(&self) -> &str {
        &self.begin
    }

    /// The literal closing marker.
    #[must_use]
    pub fn end(&self) -> &str {
        &self.end
    }
}

/// Insertion-ordered set of delimiter specs.
///
/// Duplicates (by value) are ignored on registration; iteration order is
/// insertion order, which the matcher relies on for its tie-breaking rule.
/// A new set starts with the default `${` … `}` spec; only
/// [`replace_all`](Self::replace_all) can leave the set empty.
#[derive(Debug, Clone)]
pub struct DelimiterSet {
    specs: Vec<DelimiterSpec>,
}

impl Default for DelimiterSet {
    fn default() -> Self {
        Self::new()
    }
}

impl DelimiterSet {
    /// Creates a set holding the default spec.
    #[must_use]
    pub fn new() -> Self {
        Self {
            specs: alloc::vec![DelimiterSpec::default()],
        }
    }

    /// Adds `spec` unless an equal spec is already registered. Returns
    /// whether the set changed.
    pub fn register(&mut self, spec: DelimiterSpec) -> bool {
        if self.specs.contains(&spec) {
            return false;
        }
        self.specs.push(spec);
        true
    }

    /// Removes the spec equal to `spec`, reporting whether it was present.
    pub fn remove(&mut self, spec: &DelimiterSpec) -> bool {
        let before = self.specs.len();
        self.specs.retain(|s| s != spec);
        self.specs.len() != before
    }

    /// Replaces the whole set. The existing specs (including the default)
    /// are cleared first; there is no incremental merge.
    pub fn replace_all(&mut self, specs: impl IntoIterator<Item = DelimiterSpec>) {
        self.specs.clear();
        for spec in specs {
            self.register(spec);
        }
    }

    /// Iterates specs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &DelimiterSpec> {
        self.specs.iter()
    }

    /// Number of registered specs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the set has been explicitly cleared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Minimum rewind distance, in characters, needed to safely abandon any
    /// single match attempt against this set plus an escape string of
    /// `escape_len` characters.
    pub(crate) fn lookahead_bound(&self, escape_len: usize) -> usize {
        let delims: usize = self
            .specs
            .iter()
            .map(|s| s.begin.chars().count() + s.end.chars().count())
            .sum();
        MARK_SAFETY_MARGIN + escape_len + delims
    }
}
