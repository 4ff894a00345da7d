//! Captured route parameters.
//!
//! `Params` is the sink that [`crate::tree::Node::get_value`] fills while it
//! walks a request path. Keys borrow from the route tree, values borrow from
//! the request path, so capturing a parameter never copies bytes.

// The capture path runs once per request: no heap allocations beyond a
// sink that outgrows its inline storage
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use smallvec::SmallVec;

/// Parameter name under which the path of the matched route is stored, if
/// [`crate::router::Router::save_matched_route_path`] is set.
pub const MATCHED_ROUTE_PATH: &str = "$matchedRoutePath";

/// Maximum number of path parameters stored inline before spilling to the
/// heap. Most REST APIs have well under 8 path params per route.
pub const MAX_INLINE_PARAMS: usize = 8;

/// An ordered list of `(name, value)` pairs captured during a route lookup.
///
/// Values are stored in the order the wildcards appear in the route, root
/// first. Storage is stack-allocated for routes with up to
/// [`MAX_INLINE_PARAMS`] parameters; the router pre-reserves capacity for its
/// widest route before lookup so the capture path never reallocates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params<'a> {
    entries: SmallVec<[(&'a str, &'a str); MAX_INLINE_PARAMS]>,
}

impl<'a> Params<'a> {
    /// Create an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }

    /// Get a parameter by name.
    ///
    /// Uses "last write wins" semantics: if duplicate parameter names exist
    /// at different path depths, the deepest occurrence is returned.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.entries
            .iter()
            .rfind(|(k, _)| *k == name)
            .map(|(_, v)| *v)
    }

    /// Number of captured parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.entries.iter().copied()
    }

    /// Drop all captured parameters, keeping the backing storage.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn push(&mut self, name: &'a str, value: &'a str) {
        self.entries.push((name, value));
    }

    pub(crate) fn reserve(&mut self, total: usize) {
        if total > self.entries.capacity() {
            self.entries.reserve(total - self.entries.len());
        }
    }
}

impl<'a> IntoIterator for &Params<'a> {
    type Item = (&'a str, &'a str);
    type IntoIter = smallvec::IntoIter<[(&'a str, &'a str); MAX_INLINE_PARAMS]>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.clone().into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_last_write_wins() {
        let mut params = Params::new();
        params.push("id", "org-1");
        params.push("team", "core");
        params.push("id", "user-7");
        assert_eq!(params.get("id"), Some("user-7"));
        assert_eq!(params.get("team"), Some("core"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_capture_order_preserved() {
        let mut params = Params::new();
        params.push("a", "1");
        params.push("b", "2");
        let collected: Vec<_> = params.iter().collect();
        assert_eq!(collected, vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut params = Params::new();
        params.reserve(16);
        let cap = params.entries.capacity();
        params.push("a", "1");
        params.clear();
        assert!(params.is_empty());
        assert_eq!(params.entries.capacity(), cap);
    }
}
