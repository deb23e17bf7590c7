use std::convert::TryFrom;

use anyhow::{anyhow, Result};

pub fn to_i64(value: usize) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

/// `LIKE` pattern matching `term` anywhere, with `%`, `_` and `\` escaped.
/// Use together with `ESCAPE '\'`.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// `?,?,?` for an `IN (...)` clause with `count` parameters.
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(",")
}

/// Treats `None`, empty, and whitespace-only filters alike.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("math"), "%math%");
        assert_eq!(like_pattern("100%_x"), "%100\\%\\_x%");
    }

    #[test]
    fn builds_placeholders() {
        assert_eq!(placeholders(3), "?,?,?");
        assert_eq!(placeholders(0), "");
    }
}
