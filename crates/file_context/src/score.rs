//! Similarity scoring on the fixed [0, 100] scale used by both the file
//! resolver and the edit-anchor matcher.

use similar::TextDiff;

/// Normalized character-level similarity between two strings.
///
/// Returns 100 for identical inputs, 0 for fully disjoint ones. Comparison is
/// case-insensitive so that `readme` still finds `README.md`.
#[must_use]
pub fn similarity(a: &str, b: &str) -> u8 {
    if a == b {
        return 100;
    }

    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a == b {
        return 100;
    }

    let ratio = TextDiff::from_chars(a.as_str(), b.as_str()).ratio();
    (f64::from(ratio) * 100.0).round() as u8
}

/// Case-sensitive similarity for content matching, where case carries meaning.
#[must_use]
pub fn content_similarity(a: &str, b: &str) -> u8 {
    if a == b {
        return 100;
    }

    let ratio = TextDiff::from_chars(a, b).ratio();
    (f64::from(ratio) * 100.0).round() as u8
}

/// Scores a user pattern against a root-relative candidate path.
///
/// Takes the better of the basename score and the whole-path score, so short
/// patterns like `main` are not drowned out by long directory prefixes.
#[must_use]
pub fn pattern_score(pattern: &str, relative_path: &str) -> u8 {
    let basename = relative_path
        .rsplit('/')
        .next()
        .unwrap_or(relative_path);

    similarity(pattern, basename).max(similarity(pattern, relative_path))
}

#[cfg(test)]
mod tests {
    use super::{content_similarity, pattern_score, similarity};

    #[test]
    fn identical_strings_score_100() {
        assert_eq!(similarity("main.rs", "main.rs"), 100);
        assert_eq!(content_similarity("fn main() {}", "fn main() {}"), 100);
    }

    #[test]
    fn similarity_is_case_insensitive() {
        assert_eq!(similarity("readme.md", "README.md"), 100);
    }

    #[test]
    fn content_similarity_is_case_sensitive() {
        assert!(content_similarity("README", "readme") < 100);
    }

    #[test]
    fn disjoint_strings_score_low() {
        assert!(similarity("main.rs", "zzzz") < 30);
    }

    #[test]
    fn near_misses_score_high() {
        assert!(similarity("confg.rs", "config.rs") >= 80);
    }

    #[test]
    fn pattern_score_prefers_basename_over_full_path() {
        let by_path = similarity("session.rs", "crates/session_engine/src/session.rs");
        let score = pattern_score("session.rs", "crates/session_engine/src/session.rs");
        assert!(score >= by_path);
        assert_eq!(score, 100);
    }

    #[test]
    fn empty_inputs_are_handled() {
        assert_eq!(similarity("", ""), 100);
        assert_eq!(similarity("", "main.rs"), 0);
    }
}
