use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;

use crate::{
    db::Session,
    grouping::{rank_app_counts, AppUsage, GroupingConfig},
    utils::format_hms,
};

use super::range::DateWindow;

pub const TOP_TAGS_LIMIT: usize = 7;
pub const OTHER_TAG: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub total_sessions: i64,
    pub total_duration: i64,
    pub total_duration_str: String,
    pub average_duration: i64,
    pub average_duration_str: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagTotal {
    pub tag: String,
    pub duration: i64,
    pub duration_str: String,
}

impl TagTotal {
    fn new(tag: impl Into<String>, duration: i64) -> Self {
        Self {
            tag: tag.into(),
            duration,
            duration_str: format_hms(duration),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub seconds: i64,
    pub minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsReport {
    pub range: DateWindow,
    pub overview: Overview,
    pub top_apps: Vec<AppUsage>,
    pub top_tags: Vec<TagTotal>,
    pub daily: Vec<DailyTotal>,
}

fn overview(sessions: &[Session]) -> Overview {
    let total_sessions = i64::try_from(sessions.len()).unwrap_or(i64::MAX);
    let total_duration: i64 = sessions.iter().map(|session| session.duration).sum();
    let average_duration = if total_sessions == 0 {
        0
    } else {
        total_duration / total_sessions
    };

    Overview {
        total_sessions,
        total_duration,
        total_duration_str: format_hms(total_duration),
        average_duration,
        average_duration_str: format_hms(average_duration),
    }
}

/// Summed session duration per tag, largest first, with everything past
/// the first [`TOP_TAGS_LIMIT`] folded into one "Other" bucket.
pub fn tag_totals(sessions: &[Session]) -> Vec<TagTotal> {
    let mut totals: HashMap<String, i64> = HashMap::new();
    for session in sessions {
        for tag in session.tag_list() {
            *totals.entry(tag).or_default() += session.duration;
        }
    }

    let mut ranked: Vec<(String, i64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let other: i64 = ranked.iter().skip(TOP_TAGS_LIMIT).map(|(_, total)| total).sum();
    let has_other = ranked.len() > TOP_TAGS_LIMIT;

    let mut tags: Vec<TagTotal> = ranked
        .into_iter()
        .take(TOP_TAGS_LIMIT)
        .map(|(tag, total)| TagTotal::new(tag, total))
        .collect();
    if has_other {
        tags.push(TagTotal::new(OTHER_TAG, other));
    }
    tags
}

/// Per-day focus totals for every day in `window`; days without sessions
/// are present with zero. Sessions are bucketed by their local start day.
pub fn daily_series<Tz: TimeZone>(
    window: &DateWindow,
    sessions: &[Session],
    tz: &Tz,
) -> Vec<DailyTotal> {
    let mut by_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for session in sessions {
        let Some(started) = tz.timestamp_opt(session.start_ts, 0).single() else {
            continue;
        };
        let day = started.date_naive();
        if window.contains(day) {
            *by_day.entry(day).or_default() += session.duration;
        }
    }

    window
        .days()
        .map(|date| {
            let seconds = by_day.get(&date).copied().unwrap_or(0);
            DailyTotal {
                date,
                seconds,
                minutes: seconds / 60,
            }
        })
        .collect()
}

/// Assembles the report from already-filtered sessions and the per-app
/// sample counts of those sessions.
pub fn build_report<Tz: TimeZone>(
    window: DateWindow,
    sessions: &[Session],
    app_counts: Vec<(String, i64)>,
    config: &GroupingConfig,
    tz: &Tz,
) -> AnalyticsReport {
    AnalyticsReport {
        range: window,
        overview: overview(sessions),
        top_apps: rank_app_counts(app_counts, config),
        top_tags: tag_totals(sessions),
        daily: daily_series(&window, sessions, tz),
    }
}
