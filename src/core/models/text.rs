/// Maximum stored length (in characters) of `action`.
pub const ACTION_MAX_CHARS: usize = 255;
/// Maximum stored length (in characters) of `subject_type`.
pub const SUBJECT_TYPE_MAX_CHARS: usize = 100;
/// Maximum stored length (in characters) of `subject_id`.
pub const SUBJECT_ID_MAX_CHARS: usize = 255;
/// Maximum length (in characters) of a free-text search term.
pub const SEARCH_MAX_CHARS: usize = 255;

/// Clean a free-form text field.
///
/// Line breaks, tabs and runs of whitespace collapse to a single space,
/// control characters are removed, the result is trimmed and cut to
/// `max_chars` characters. Returns `None` when nothing is left.
pub fn sanitize(raw: &str, max_chars: usize) -> Option<String> {
    let collapsed = raw
        .split_whitespace()
        .map(|word| word.chars().filter(|c| !c.is_control()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let bounded: String = collapsed.chars().take(max_chars).collect();
    let bounded = bounded.trim_end().to_string();

    if bounded.is_empty() {
        None
    } else {
        Some(bounded)
    }
}

/// Escape `%`, `_` and `\` so `term` matches literally inside a
/// `LIKE ... ESCAPE '\'` pattern.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
