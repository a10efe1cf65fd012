//! Output formatting utilities

/// Truncate a string to at most `max_len` characters, marking the cut with
/// an ellipsis.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len < 3 {
        return "...".chars().take(max_len).collect();
    }
    let trimmed: String = s.chars().take(max_len - 3).collect();
    format!("{}...", trimmed.trim_end())
}

/// Format a percentage with one decimal place.
pub fn format_percentage(value: f64) -> String {
    format!("{value:.1}%")
}

/// Render a horizontal rule of the given width.
pub fn rule(ch: char, width: usize) -> String {
    std::iter::repeat_n(ch, width).collect()
}
