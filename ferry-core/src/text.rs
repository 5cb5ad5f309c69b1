//! Text clean-up for content replayed into another repository

use std::sync::OnceLock;

use regex::Regex;

fn mention_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"@\w+").expect("mention pattern is valid"))
}

/// Remove `@user` mentions so replayed content does not notify anyone
pub fn strip_mentions(text: &str) -> String {
    mention_pattern().replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_mentions_anywhere() {
        assert_eq!(strip_mentions("@alice thanks"), " thanks");
        assert_eq!(strip_mentions("cc @bob_2, @carol"), "cc , ");
        assert_eq!(strip_mentions("ping @dave"), "ping ");
    }

    #[test]
    fn test_leaves_plain_text() {
        assert_eq!(strip_mentions("no mentions here"), "no mentions here");
        assert_eq!(strip_mentions("a lone @ sign"), "a lone @ sign");
    }
}
