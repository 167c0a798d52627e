//! Text cleanup for everything that enters the broadcast stream.

/// Collapse every whitespace run to a single space and trim both ends.
pub fn normalize_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `value` to at most `max_len` code points. `0` means no limit.
pub fn truncate_chars(value: &str, max_len: usize) -> &str {
    if max_len == 0 {
        return value;
    }
    match value.char_indices().nth(max_len) {
        Some((byte_idx, _)) => &value[..byte_idx],
        None => value,
    }
}

pub fn normalize_name(raw: &str, fallback: &str, max_len: usize) -> String {
    let candidate = normalize_whitespace(raw);
    let candidate = if candidate.is_empty() {
        fallback
    } else {
        candidate.as_str()
    };
    truncate_chars(candidate, max_len).to_string()
}

/// Returns `None` when nothing but whitespace was sent.
pub fn normalize_message(raw: &str, max_len: usize) -> Option<String> {
    let candidate = normalize_whitespace(raw);
    if candidate.is_empty() {
        return None;
    }
    Some(truncate_chars(&candidate, max_len).to_string())
}
