//! Window-title normalization.
//!
//! Browsers put volatile text in front of the page title (a countdown, a
//! media position, an unread counter with a clock). Left as-is, every tick
//! of that clock would become its own activity block.

const BROWSERS: &[&str] = &[
    "brave",
    "firefox",
    "chrome",
    "chromium",
    "librewolf",
    "vivaldi",
    "opera",
    "edge",
    "zen",
    "floorp",
    "safari",
];

const SEPARATORS: &[&str] = &[" - ", " \u{2014} "];

/// Whether `app_name` identifies a known browser. Matched per word, so
/// `brave-browser` and `org.mozilla.firefox` both qualify.
pub fn is_browser(app_name: &str) -> bool {
    app_name
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| BROWSERS.contains(&word))
}

fn looks_like_clock(segment: &str) -> bool {
    segment.contains(':') && segment.chars().any(|c| c.is_ascii_digit())
}

/// Title used for grouping. For browsers whose title opens with a clock
/// token, the text after the last separator is kept; all other titles pass
/// through unchanged.
pub fn clean_title(app_name: &str, title: &str) -> String {
    if !is_browser(app_name) {
        return title.to_string();
    }

    let first = SEPARATORS
        .iter()
        .filter_map(|sep| title.find(sep))
        .min();
    let Some(first) = first else {
        return title.to_string();
    };
    if !looks_like_clock(&title[..first]) {
        return title.to_string();
    }

    let last = SEPARATORS
        .iter()
        .filter_map(|sep| title.rfind(sep).map(|pos| pos + sep.len()))
        .max();
    match last.map(|start| title[start..].trim()) {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => title.to_string(),
    }
}
