//! Identifier sanitization for generated enumeration members.
//!
//! Descriptions come straight out of lookup tables, so they carry spaces,
//! punctuation, and leading digits. The steps below run in a fixed order;
//! later steps assume the normalization done by earlier ones.
use regex::Regex;
use std::sync::OnceLock;

/// Reserved words of the generated language that cannot be member names.
pub const DEFAULT_RESERVED_WORDS: &[&str] = &["Operator", "Private"];

fn non_alphanumeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^0-9a-zA-Z]").expect("regex for non-alphanumeric"))
}

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("regex for whitespace runs"))
}

/// Turns descriptions into identifiers against a configurable reserved-word list.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    reserved_words: Vec<String>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVED_WORDS.iter().map(|word| word.to_string()))
    }
}

impl Sanitizer {
    pub fn new<I>(reserved_words: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            reserved_words: reserved_words.into_iter().collect(),
        }
    }

    /// Sanitize a description, returning `None` when nothing identifier-shaped remains.
    pub fn try_sanitize(&self, description: &str) -> Option<String> {
        let normalized = description.replace('&', " and ").replace("(s)", "s");
        let spaced = non_alphanumeric().replace_all(&normalized, " ");
        let collapsed = whitespace_run().replace_all(&spaced, " ");
        let identifier = collapsed.trim().replace(' ', "_");
        if identifier.is_empty() {
            return None;
        }
        if self.needs_prefix(&identifier) {
            return Some(format!("_{identifier}"));
        }
        Some(identifier)
    }

    /// Total variant of [`Sanitizer::try_sanitize`]; an empty result becomes `_`.
    #[cfg(test)]
    pub(crate) fn sanitize(&self, description: &str) -> String {
        self.try_sanitize(description)
            .unwrap_or_else(|| "_".to_string())
    }

    fn needs_prefix(&self, identifier: &str) -> bool {
        let starts_with_digit = identifier
            .chars()
            .next()
            .is_some_and(|ch| ch.is_ascii_digit());
        starts_with_digit || self.reserved_words.iter().any(|word| word == identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitize(description: &str) -> String {
        Sanitizer::default().sanitize(description)
    }

    fn is_identifier_shaped(value: &str) -> bool {
        value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    }

    #[test]
    fn spaces_become_underscores() {
        assert_eq!(sanitize("In Progress"), "In_Progress");
        assert_eq!(sanitize("  Active  "), "Active");
    }

    #[test]
    fn ampersand_becomes_and() {
        let out = sanitize("B2B & Retail");
        assert_eq!(out, "B2B_and_Retail");
        assert!(!out.contains('&'));
        assert_eq!(sanitize("R&D"), "R_and_D");
    }

    #[test]
    fn plural_marker_is_normalized() {
        assert_eq!(sanitize("Item(s) Shipped"), "Items_Shipped");
    }

    #[test]
    fn punctuation_collapses_to_single_underscore() {
        assert_eq!(sanitize("Pending -- Review!"), "Pending_Review");
        assert_eq!(sanitize("a/b\\c"), "a_b_c");
        assert_eq!(sanitize("Tab\there"), "Tab_here");
    }

    #[test]
    fn leading_digit_is_prefixed() {
        assert_eq!(sanitize("30 Days"), "_30_Days");
        assert_eq!(sanitize("  1st"), "_1st");
    }

    #[test]
    fn reserved_words_are_prefixed() {
        assert_eq!(sanitize("Operator"), "_Operator");
        assert_eq!(sanitize("Private"), "_Private");
        assert_eq!(sanitize("Private Label"), "Private_Label");
    }

    #[test]
    fn custom_reserved_words_replace_defaults() {
        let sanitizer = Sanitizer::new(vec!["Public".to_string()]);
        assert_eq!(sanitizer.sanitize("Public"), "_Public");
        assert_eq!(sanitizer.sanitize("Operator"), "Operator");
    }

    #[test]
    fn nothing_left_is_reported_as_none() {
        let sanitizer = Sanitizer::default();
        assert_eq!(sanitizer.try_sanitize("!!!"), None);
        assert_eq!(sanitizer.try_sanitize("   "), None);
        assert_eq!(sanitizer.try_sanitize("Café"), Some("Caf".to_string()));
        assert_eq!(sanitizer.sanitize(""), "_");
    }

    #[test]
    fn sanitizing_twice_is_stable() {
        let inputs = [
            "In Progress",
            "B2B & Retail",
            "Item(s)",
            "30 Days",
            "Operator",
            "_Private",
            "already_fine",
            "__x__",
            "!!!",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn outputs_are_identifier_shaped() {
        let inputs = ["a.b", "9 Lives", "x & y (s)", "ünïcode ok", "Operator", "\"quoted\""];
        for input in inputs {
            let out = sanitize(input);
            assert!(is_identifier_shaped(&out), "{out:?}");
            assert!(!out.starts_with(|ch: char| ch.is_ascii_digit()));
            assert!(!DEFAULT_RESERVED_WORDS.contains(&out.as_str()));
        }
    }
}
