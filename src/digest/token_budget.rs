//! Token estimation for prompt sizing.
//!
//! Uses a fixed characters-per-token ratio rather than a real tokenizer.
//! Every size decision in the batching engine goes through these two
//! functions so that estimates are comparable across the whole run.

/// Estimates the token count of `text`.
///
/// Computed as `floor(chars / chars_per_token)` over Unicode scalar values.
/// A zero ratio is rejected by [`DigestConfig::validate`](crate::config::DigestConfig::validate)
/// and yields zero here.
#[must_use]
pub fn estimate_tokens(text: &str, chars_per_token: usize) -> usize {
    estimate_tokens_from_char_count(text.chars().count(), chars_per_token)
}

/// Estimates token count from a pre-computed character count.
#[must_use]
pub fn estimate_tokens_from_char_count(char_count: usize, chars_per_token: usize) -> usize {
    char_count.checked_div(chars_per_token).unwrap_or(0)
}
