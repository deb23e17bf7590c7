//! Read-side reporting over stopped sessions and their activity samples.

pub mod range;
pub mod report;
pub mod summary;

use chrono::{NaiveDate, TimeZone};
use serde::Deserialize;

use crate::{
    db::{helpers::non_blank, Database},
    error::StudyResult,
    grouping::GroupingConfig,
};

pub use range::{resolve_window, DateWindow, RangeType};
pub use report::{build_report, AnalyticsReport, DailyTotal, Overview, TagTotal};
pub use summary::{session_summary, SessionHeader, SessionSummary};

/// Filters accepted by the analytics report. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub tag: Option<String>,
    pub range_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl AnalyticsQuery {
    pub fn range_type(&self) -> StudyResult<RangeType> {
        match non_blank(self.range_type.as_deref()) {
            Some(raw) => raw.parse(),
            None => Ok(RangeType::default()),
        }
    }
}

/// Builds the analytics report for `query`, with "today" and day boundaries
/// taken in `tz`.
pub async fn analytics_report<Tz: TimeZone>(
    db: &Database,
    query: &AnalyticsQuery,
    today: NaiveDate,
    tz: &Tz,
    config: &GroupingConfig,
) -> StudyResult<AnalyticsReport> {
    let window = resolve_window(
        query.range_type()?,
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        today,
    )?;
    let (from_ts, to_ts) = window.timestamp_bounds(tz);

    let mut sessions = db.list_closed_sessions_between(from_ts, to_ts).await?;
    if let Some(tag) = non_blank(query.tag.as_deref()) {
        let needle = tag.to_lowercase();
        sessions.retain(|session| session.tags.to_lowercase().contains(&needle));
    }

    let session_ids: Vec<i64> = sessions.iter().map(|session| session.id).collect();
    let app_counts = db.app_sample_counts(&session_ids).await?;

    Ok(build_report(window, &sessions, app_counts, config, tz))
}
