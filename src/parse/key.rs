use std::sync::LazyLock;

use regex::Regex;

static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[?([A-Z]+-\d+)\]?").expect("valid key pattern"));

static KEY_IN_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\[?[A-Z]+-\d+\]?\s*").expect("valid key pattern"));

static EXACT_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]+-\d+$").expect("valid key pattern"));

/// First ticket key found anywhere in `text`, brackets optional.
pub fn extract_key(text: &str) -> Option<&str> {
    KEY_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Strip every ticket key (and its brackets) from a title.
///
/// Surrounding whitespace collapses to a single space, so
/// `remove_key(remove_key(s)) == remove_key(s)`.
pub fn remove_key(title: &str) -> String {
    let stripped = KEY_IN_TITLE_RE.replace_all(title, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `s` is exactly a ticket key such as `OBS-12`
pub fn is_ticket_key(s: &str) -> bool {
    EXACT_KEY_RE.is_match(s)
}
