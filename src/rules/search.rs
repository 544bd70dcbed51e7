//! Search pattern compilation and application
//!
//! User-supplied patterns are compiled once into a [`SearchState`]; a
//! malformed pattern becomes an error marker rather than a fault, and the
//! derived view falls back to the unfiltered list. Rust's `regex` matchers
//! carry no scan position between calls, so reusing one compiled matcher for
//! both filtering and highlighting is safe.

use regex::RegexBuilder;

use crate::types::{StoreError, StoreResult};

const MARK_OPEN: &str = "<mark>";
const MARK_CLOSE: &str = "</mark>";

/// Current search: either nothing, a compiled matcher, or an error marker.
/// Never both a matcher and an error.
#[derive(Debug, Clone)]
pub enum SearchState {
    /// No pattern set; the view is unfiltered
    Inactive,
    /// A compiled, usable matcher
    Active { raw: String, matcher: regex::Regex },
    /// The pattern failed to compile; the view falls back to unfiltered
    Invalid { raw: String, error: String },
}

impl Default for SearchState {
    fn default() -> Self {
        SearchState::Inactive
    }
}

impl SearchState {
    /// Compile a pattern into a search state.
    ///
    /// An empty pattern means "no filter", not an error. A malformed pattern
    /// is captured as [`SearchState::Invalid`] with the engine's error text;
    /// nothing propagates past this boundary.
    pub fn compile(pattern: &str, case_sensitive: bool) -> SearchState {
        if pattern.is_empty() {
            return SearchState::Inactive;
        }
        match compile_regex(pattern, case_sensitive) {
            Ok(matcher) => SearchState::Active {
                raw: pattern.to_string(),
                matcher,
            },
            Err(err) => SearchState::Invalid {
                raw: pattern.to_string(),
                error: err.to_string(),
            },
        }
    }

    /// The raw pattern as the user typed it, if any.
    pub fn pattern(&self) -> Option<&str> {
        match self {
            SearchState::Inactive => None,
            SearchState::Active { raw, .. } | SearchState::Invalid { raw, .. } => Some(raw),
        }
    }

    /// The compile error, if the pattern was malformed.
    pub fn error(&self) -> Option<&str> {
        match self {
            SearchState::Invalid { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SearchState::Active { .. })
    }

    /// Whether `text` passes the filter. Without a usable matcher (inactive
    /// or invalid state) everything passes — the filter degrades to identity.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            SearchState::Active { matcher, .. } => matcher.is_match(text),
            SearchState::Inactive | SearchState::Invalid { .. } => true,
        }
    }

    /// Wrap every match in `text` for visual emphasis.
    ///
    /// Inactive and invalid states are the identity transform.
    pub fn highlight(&self, text: &str) -> String {
        match self {
            SearchState::Active { matcher, .. } => matcher
                .replace_all(text, |captures: &regex::Captures<'_>| {
                    format!("{MARK_OPEN}{}{MARK_CLOSE}", &captures[0])
                })
                .into_owned(),
            SearchState::Inactive | SearchState::Invalid { .. } => text.to_string(),
        }
    }
}

/// Build a matcher from a user-supplied pattern.
///
/// Case-insensitivity is set at build time rather than spliced into the
/// pattern, so user input is never reinterpreted as flag syntax.
pub fn compile_regex(pattern: &str, case_sensitive: bool) -> StoreResult<regex::Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|err| StoreError::MalformedPattern {
            reason: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pattern_is_no_filter() {
        let state = SearchState::compile("", false);
        assert!(matches!(state, SearchState::Inactive));
        assert!(state.matches("anything"));
        assert_eq!(state.highlight("anything"), "anything");
    }

    #[test]
    fn malformed_pattern_becomes_error_marker() {
        let state = SearchState::compile("(unterminated", false);
        assert!(state.error().is_some());
        assert_eq!(state.pattern(), Some("(unterminated"));
        // Degrades to identity for both filtering and highlighting
        assert!(state.matches("anything"));
        assert_eq!(state.highlight("anything"), "anything");
    }

    #[test]
    fn case_sensitivity_is_honored() {
        let insensitive = SearchState::compile("coffee", false);
        assert!(insensitive.matches("Morning COFFEE run"));

        let sensitive = SearchState::compile("coffee", true);
        assert!(!sensitive.matches("Morning COFFEE run"));
        assert!(sensitive.matches("morning coffee run"));
    }

    #[test]
    fn highlight_wraps_every_match() {
        let state = SearchState::compile("o", true);
        assert_eq!(
            state.highlight("foo"),
            "f<mark>o</mark><mark>o</mark>"
        );
    }

    #[test]
    fn repeated_use_of_one_matcher_stays_consistent() {
        let state = SearchState::compile("tea", false);
        // Filtering then highlighting then filtering again must not drift
        assert!(state.matches("green tea"));
        assert_eq!(state.highlight("green tea"), "green <mark>tea</mark>");
        assert!(state.matches("green tea"));
    }

    #[test]
    fn compile_regex_reports_malformed_patterns() {
        let err = compile_regex("[", false).unwrap_err();
        assert!(matches!(err, StoreError::MalformedPattern { .. }));
    }
}
