//! Session data models.

use serde::{Deserialize, Serialize};

/// One study attempt. `end_ts == 0` marks the session as still open;
/// `duration` is written once, when the session is stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub name: String,
    pub tags: String,
    pub start_ts: i64,
    pub end_ts: i64,
    pub duration: i64,
    pub target_duration: i64,
}

impl Session {
    pub fn is_open(&self) -> bool {
        self.end_ts == 0
    }

    pub fn is_countdown(&self) -> bool {
        self.target_duration > 0
    }

    /// Individual tags, trimmed, with empty entries removed.
    pub fn tag_list(&self) -> Vec<String> {
        split_tags(&self.tags)
    }
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub name: String,
    pub tags: String,
    pub start_ts: i64,
    pub target_duration: i64,
}

/// Substring filters for session listings. Matching is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub name: Option<String>,
    pub tag: Option<String>,
    pub limit: Option<usize>,
}

pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Canonical stored form of a tag list: `"a, b, c"`.
pub fn normalize_tags(raw: &str) -> String {
    split_tags(raw).join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_tag_lists() {
        assert_eq!(normalize_tags(" math,, physics ,"), "math, physics");
        assert_eq!(normalize_tags(""), "");
        assert!(split_tags(" , ").is_empty());
    }
}
