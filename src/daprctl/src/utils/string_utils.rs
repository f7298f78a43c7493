/// Shortens `value` to at most `max_length` characters, marking the cut with `...`.
pub fn truncate_string(value: &str, max_length: usize) -> String {
    if value.chars().count() <= max_length {
        return value.to_string();
    }

    let keep = max_length.saturating_sub(3);
    let mut truncated: String = value.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::truncate_string;

    #[test]
    fn test_short_strings_are_untouched() {
        assert_eq!(truncate_string("", 20), "");
        assert_eq!(truncate_string("node app.js", 20), "node app.js");
        assert_eq!(truncate_string("12345678901234567890", 20), "12345678901234567890");
    }

    #[test]
    fn test_long_strings_are_cut() {
        assert_eq!(
            truncate_string("python3 -m flask run --port 5000", 20),
            "python3 -m flask ..."
        );
    }

    #[test]
    fn test_multibyte_characters() {
        assert_eq!(truncate_string("ééééééé", 5), "éé...");
    }
}
