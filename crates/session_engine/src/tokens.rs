//! Character-count token estimation.
//!
//! No tokenizer dependency: the engine only needs a stable upper-level signal
//! for budgeting, so it uses the classic four-characters-per-token heuristic.
//! Deterministic, monotonic in input length, never performs I/O.

/// Average characters per token assumed by the estimate.
pub const CHARS_PER_TOKEN: u64 = 4;

/// Estimates the token count of a text, rounding up.
#[must_use]
pub fn estimate(text: &str) -> u64 {
    let chars = text.chars().count() as u64;
    chars.div_ceil(CHARS_PER_TOKEN)
}
