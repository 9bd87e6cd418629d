//! Character-based token estimation and truncation.

/// Approximate characters per token.
const CHARS_PER_TOKEN: usize = 4;

/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "...";

/// Estimate the token count of `text`, never less than one.
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    (text.chars().count() / CHARS_PER_TOKEN).max(1)
}

/// Truncate `text` so it fits roughly within `max_tokens`.
///
/// Text already within budget is returned unchanged. Otherwise the leading
/// share of characters proportional to the budget is kept and [`ELLIPSIS`]
/// is appended.
#[must_use]
pub fn compress(text: &str, max_tokens: usize) -> String {
    let estimated = estimate_tokens(text);
    if estimated <= max_tokens {
        return text.to_string();
    }

    // floor(len * max_tokens / estimated) without going through floats
    let target_len = text.chars().count() * max_tokens / estimated;
    let mut out: String = text.chars().take(target_len).collect();
    out.push_str(ELLIPSIS);
    out
}
