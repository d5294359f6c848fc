//! Packaging include/exclude filters.
//!
//! A filter is written as a space separated list of packaging names.  A name
//! prefixed with `!` excludes that packaging; any other name includes it.
//! Exclusions always win, and a filter without inclusions accepts every
//! packaging that is not excluded.
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

/// Immutable set of included and excluded packagings.
///
/// # Examples
///
/// ```
/// use project_settings::config::packaging::PackagingFilter;
///
/// let filter = PackagingFilter::parse(Some("jar !pom"));
/// assert!(filter.test("jar"));
/// assert!(!filter.test("pom"));
/// assert!(!filter.test("war"));
/// assert_eq!(filter.to_string(), "!pom jar");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PackagingFilter {
    excluded: BTreeSet<String>,
    included: BTreeSet<String>,
}

impl PackagingFilter {
    /// Parse a filter from its textual form.
    ///
    /// `None` and blank input yield the empty filter, which matches every
    /// packaging.  A token present both as `x` and `!x` lands in both sets;
    /// [`test`](Self::test) then rejects `x`.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        let mut filter = Self::default();
        for token in value.unwrap_or_default().split_whitespace() {
            match token.strip_prefix('!') {
                Some(excluded) => filter.excluded.insert(excluded.to_string()),
                None => filter.included.insert(token.to_string()),
            };
        }
        filter
    }

    /// Packagings rejected by this filter.
    #[must_use]
    pub const fn excluded(&self) -> &BTreeSet<String> {
        &self.excluded
    }

    /// Packagings accepted by this filter; empty means "all".
    #[must_use]
    pub const fn included(&self) -> &BTreeSet<String> {
        &self.included
    }

    /// `true` when the filter has neither inclusions nor exclusions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty() && self.included.is_empty()
    }

    /// Combine this (ambient) filter with a per-file filter.
    ///
    /// The local filter never merges with the ambient one: when it parses to
    /// an empty filter, `self` is returned untouched (borrowed), otherwise the
    /// local filter replaces `self` entirely.
    #[must_use]
    pub fn join(&self, local: Option<&str>) -> Cow<'_, Self> {
        let other = Self::parse(local);
        if other.is_empty() {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(other)
        }
    }

    /// Check whether `packaging` passes this filter.
    #[must_use]
    pub fn test(&self, packaging: &str) -> bool {
        if self.excluded.contains(packaging) {
            return false;
        }
        self.included.is_empty() || self.included.contains(packaging)
    }
}

impl fmt::Display for PackagingFilter {
    /// Canonical form: every token (`!x` or `x`) sorted ascending, space joined.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens: Vec<String> = self
            .excluded
            .iter()
            .map(|s| format!("!{s}"))
            .chain(self.included.iter().cloned())
            .collect();
        tokens.sort();
        f.write_str(&tokens.join(" "))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn none_and_blank_parse_to_match_all() {
        for value in [None, Some(""), Some("   "), Some("\t\n")] {
            let filter = PackagingFilter::parse(value);
            assert!(filter.is_empty(), "{value:?} should be empty");
            assert!(filter.test("jar"));
            assert!(filter.test("pom"));
            assert!(filter.test(""));
        }
    }

    #[test]
    fn single_exclusion() {
        let filter = PackagingFilter::parse(Some("!a"));
        assert!(!filter.test("a"));
        assert!(filter.test("anything-else"));
    }

    #[test]
    fn mixed_inclusions_and_exclusions() {
        let filter = PackagingFilter::parse(Some("a !b c !d"));
        assert!(filter.test("a"));
        assert!(!filter.test("b"));
        assert!(filter.test("c"));
        assert!(!filter.test("d"));
        assert!(!filter.test("e"), "unlisted packaging fails once inclusions exist");
    }

    #[test]
    fn exclusion_wins_over_inclusion_of_same_token() {
        let filter = PackagingFilter::parse(Some("x !x"));
        assert!(filter.excluded().contains("x"));
        assert!(filter.included().contains("x"));
        assert!(!filter.test("x"));
    }

    #[test]
    fn canonical_form_is_sorted() {
        let filter = PackagingFilter::parse(Some("war !pom jar !bundle"));
        insta::assert_snapshot!(filter.to_string(), @"!bundle !pom jar war");
    }

    #[test]
    fn empty_filter_renders_empty_string() {
        assert_eq!(PackagingFilter::parse(None).to_string(), "");
    }

    #[test]
    fn canonical_form_round_trips() {
        for value in ["", "!pom", "a !b c !d", "d c b a", "  jar\twar  !pom ", "x !x"] {
            let filter = PackagingFilter::parse(Some(value));
            let reparsed = PackagingFilter::parse(Some(&filter.to_string()));
            assert_eq!(reparsed, filter, "round trip of {value:?}");
        }
    }

    #[test]
    fn equality_ignores_token_order() {
        assert_eq!(
            PackagingFilter::parse(Some("a !b c")),
            PackagingFilter::parse(Some("c a !b"))
        );
        assert_ne!(
            PackagingFilter::parse(Some("a")),
            PackagingFilter::parse(Some("!a"))
        );
    }

    #[test]
    fn join_with_blank_returns_same_instance() {
        let filter = PackagingFilter::parse(Some("!pom"));
        for local in [None, Some(""), Some("   ")] {
            let joined = filter.join(local);
            assert!(
                matches!(joined, Cow::Borrowed(f) if std::ptr::eq(f, &filter)),
                "join({local:?}) should borrow the ambient filter"
            );
        }
    }

    #[test]
    fn join_with_spec_replaces_ambient() {
        let filter = PackagingFilter::parse(Some("!pom"));
        let joined = filter.join(Some("jar"));
        assert_eq!(*joined, PackagingFilter::parse(Some("jar")));
        assert!(!joined.test("war"));
        assert!(joined.test("jar"));
    }

    #[test]
    fn join_does_not_merge_exclusions() {
        let filter = PackagingFilter::parse(Some("!pom"));
        let joined = filter.join(Some("!war"));
        assert!(joined.test("pom"), "ambient exclusion is discarded");
        assert!(!joined.test("war"));
    }
}
