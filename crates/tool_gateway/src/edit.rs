//! Anchor matching for `edit_file`.
//!
//! The requested snippet is located verbatim when possible. Otherwise a
//! sliding window of the same line count is scored against the snippet and
//! the best window wins, provided it clears the minimum score and beats any
//! non-overlapping runner-up by a clear margin.

use std::path::Path;

use file_context::content_similarity;

use crate::error::ToolError;

/// Minimum lead the best window must hold over a non-overlapping runner-up.
const RUNNER_UP_MARGIN: u8 = 5;

/// Applies the edit and returns the new content with the match score.
pub(crate) fn apply_anchor_edit(
    path: &Path,
    content: &str,
    original_snippet: &str,
    new_snippet: &str,
    min_score: u8,
) -> Result<(String, u8), ToolError> {
    let exact_matches = content.match_indices(original_snippet).count();
    match exact_matches {
        1 => {
            return Ok((content.replacen(original_snippet, new_snippet, 1), 100));
        }
        0 => {}
        matches => {
            return Err(ToolError::AmbiguousEdit {
                path: path.to_path_buf(),
                matches,
            });
        }
    }

    let lines: Vec<&str> = content.split('\n').collect();
    let window = original_snippet.split('\n').count();
    if window > lines.len() {
        return Err(ToolError::NoEditMatch {
            path: path.to_path_buf(),
            best_score: 0,
            min_score,
        });
    }

    let scores: Vec<u8> = (0..=lines.len() - window)
        .map(|start| {
            let candidate = lines[start..start + window].join("\n");
            content_similarity(original_snippet, &candidate)
        })
        .collect();

    let (best_start, best_score) = scores
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .unwrap_or((0, 0));

    if best_score < min_score {
        return Err(ToolError::NoEditMatch {
            path: path.to_path_buf(),
            best_score,
            min_score,
        });
    }

    // Windows overlapping the winner echo its lines and are not rivals.
    let rivals = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(start, score)| {
            start.abs_diff(best_start) >= window && *score >= min_score
        })
        .count();
    let runner_up = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(start, _)| start.abs_diff(best_start) >= window)
        .map(|(_, score)| score)
        .max()
        .unwrap_or(0);

    if rivals > 0 && best_score.saturating_sub(runner_up) < RUNNER_UP_MARGIN {
        return Err(ToolError::AmbiguousEdit {
            path: path.to_path_buf(),
            matches: rivals + 1,
        });
    }

    let mut updated: Vec<&str> = Vec::with_capacity(lines.len());
    updated.extend_from_slice(&lines[..best_start]);
    updated.extend(new_snippet.split('\n'));
    updated.extend_from_slice(&lines[best_start + window..]);

    Ok((updated.join("\n"), best_score))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use assert_matches::assert_matches;

    use super::apply_anchor_edit;
    use crate::error::ToolError;

    fn edit(content: &str, original: &str, new: &str) -> Result<(String, u8), ToolError> {
        apply_anchor_edit(Path::new("test.rs"), content, original, new, 85)
    }

    #[test]
    fn exact_unique_match_is_replaced() {
        let (updated, score) = edit("fn a() {}\nfn b() {}\n", "fn b() {}", "fn b() -> u8 { 0 }")
            .unwrap();
        assert_eq!(updated, "fn a() {}\nfn b() -> u8 { 0 }\n");
        assert_eq!(score, 100);
    }

    #[test]
    fn duplicate_exact_matches_are_ambiguous() {
        let error = edit("let x = 1;\nlet x = 1;\n", "let x = 1;", "let x = 2;").unwrap_err();
        assert_matches!(error, ToolError::AmbiguousEdit { matches: 2, .. });
    }

    #[test]
    fn near_match_is_found_by_fuzzy_window() {
        let content = "fn compute(value: u32) -> u32 {\n    value * 2\n}\n";
        // Whitespace drift inside the anchor.
        let (updated, score) = edit(
            content,
            "fn compute(value: u32) -> u32 {\n    value *  2\n}",
            "fn compute(value: u32) -> u32 {\n    value * 3\n}",
        )
        .unwrap();
        assert!(updated.contains("value * 3"));
        assert!(score >= 85 && score < 100);
    }

    #[test]
    fn unrelated_snippet_is_no_match() {
        let error = edit("alpha\nbeta\ngamma\n", "zzzz\nqqqq", "x").unwrap_err();
        assert_matches!(
            error,
            ToolError::NoEditMatch { best_score, .. } if best_score < 85
        );
    }

    #[test]
    fn two_near_identical_regions_are_ambiguous() {
        let content = "\
fn handler_a() {\n    process(1);\n}\n\nfn handler_b() {\n    process(1);\n}\n";
        let error = edit(content, "    process(1) ;", "    process(2);").unwrap_err();
        assert_matches!(error, ToolError::AmbiguousEdit { .. });
    }

    #[test]
    fn snippet_longer_than_file_is_no_match() {
        let error = edit("one line", "a\nb\nc\nd", "x").unwrap_err();
        assert_matches!(error, ToolError::NoEditMatch { .. });
    }

    #[test]
    fn trailing_newline_is_preserved() {
        let content = "first\nsecond\n";
        let (updated, _) = edit(content, "second", "2nd").unwrap();
        assert_eq!(updated, "first\n2nd\n");
    }
}
