/// Cut `text` to `max_chars` characters and append `...` when it is longer.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn star_bar(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(truncate_text("Short text", 20), "Short text");
        assert_eq!(truncate_text("", 3), "");
    }

    #[test]
    fn long_text_is_cut_with_ellipsis() {
        assert_eq!(
            truncate_text("This is a very long text that should be truncated", 20),
            "This is a very long ..."
        );
    }

    #[test]
    fn exact_length_is_unchanged() {
        assert_eq!(truncate_text("abcde", 5), "abcde");
    }

    #[test]
    fn cuts_on_char_boundaries() {
        assert_eq!(truncate_text("café crème", 4), "café...");
    }

    #[test]
    fn star_bar_fills_rating() {
        assert_eq!(star_bar(3), "★★★☆☆");
        assert_eq!(star_bar(9), "★★★★★");
    }
}
