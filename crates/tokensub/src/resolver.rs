//! Key resolution and the recursion guard capability.

use alloc::{
    collections::BTreeMap,
    string::{String, ToString},
    vec::Vec,
};
use core::convert::Infallible;

/// Resolves the key found between a token's delimiters.
///
/// The filter classifies the outcome three ways:
///
/// - `Ok(Some(value))`: the token is replaced by `value`.
/// - `Ok(None)`: the key is explicitly unresolved; the token is left in the
///   output exactly as written.
/// - `Err(_)`: resolution failed (for example a cyclic reference detected
///   through the [`RecursionGuard`]); the failure aborts the in-progress read
///   and is not retried.
pub trait Resolver {
    /// Error reported on resolution failure.
    type Error;

    /// Resolves `key` to a value, or `None` if the key has no value.
    ///
    /// `prefix_pattern` carries the call convention configured on the filter:
    /// when `true` the resolver is expected to consult its value sources with
    /// an additional empty namespace prefix. `guard` is the filter's active
    /// recursion guard, passed through on every call; resolvers that expand
    /// nested expressions use it to detect cycles.
    fn resolve(
        &mut self,
        key: &str,
        prefix_pattern: bool,
        guard: &mut RecursionGuard,
    ) -> Result<Option<String>, Self::Error>;
}

/// Expression-stack capability used by resolvers to detect cyclic keys.
///
/// The filter owns one guard, hands it to the resolver on every call, and
/// never inspects its contents. A guard can be replaced wholesale via
/// [`TokenFilter::set_recursion_guard`](crate::TokenFilter::set_recursion_guard),
/// e.g. to share tracking state across several filters resolving against the
/// same store.
#[derive(Debug, Clone, Default)]
pub struct RecursionGuard {
    stack: Vec<String>,
}

impl RecursionGuard {
    /// Creates an empty guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key` as in-flight. Returns `false` if the key is already on
    /// the stack, which means resolving it again would cycle.
    pub fn enter(&mut self, key: &str) -> bool {
        if self.stack.iter().any(|k| k == key) {
            return false;
        }
        self.stack.push(key.to_string());
        true
    }

    /// Unwinds the most recent successful [`enter`](Self::enter).
    pub fn leave(&mut self) {
        self.stack.pop();
    }

    /// Number of keys currently in flight.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// A map-backed [`Resolver`] with no expression semantics of its own.
///
/// Every key maps to at most one flat value; lookups cannot fail, so the
/// error type is [`Infallible`]. This is the stock resolver for plain
/// property substitution and doubles as the test resolver.
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    values: BTreeMap<String, String>,
}

impl MapResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Removes the value for `key`, returning it if present.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }
}

impl Resolver for MapResolver {
    type Error = Infallible;

    fn resolve(
        &mut self,
        key: &str,
        _prefix_pattern: bool,
        _guard: &mut RecursionGuard,
    ) -> Result<Option<String>, Infallible> {
        Ok(self.values.get(key).cloned())
    }
}
