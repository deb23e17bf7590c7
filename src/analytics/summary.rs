use serde::Serialize;

use crate::{
    db::{Database, Session},
    error::{StudyError, StudyResult},
    grouping::{group_activity, top_apps, ActivityGroup, AppUsage, GroupingConfig},
    ledger,
    utils::format_hms,
};

#[derive(Debug, Clone, Serialize)]
pub struct SessionHeader {
    #[serde(flatten)]
    pub session: Session,
    pub running: bool,
    /// Stored duration once stopped, live focus time while open.
    pub focus_seconds: i64,
    pub duration_str: String,
    pub total_break: i64,
    pub total_break_str: String,
    pub sample_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session: SessionHeader,
    pub top_apps: Vec<AppUsage>,
    pub activity: Vec<ActivityGroup>,
}

/// Everything recorded for one session, grouped for display.
pub async fn session_summary(
    db: &Database,
    session_id: i64,
    now: i64,
    config: &GroupingConfig,
) -> StudyResult<SessionSummary> {
    let session = db
        .get_session(session_id)
        .await?
        .ok_or(StudyError::SessionNotFound(session_id))?;

    let breaks = db.list_breaks(session_id).await?;
    let samples = db.get_activity_for_session(session_id).await?;

    let running = session.is_open();
    let break_until = if running { now } else { session.end_ts };
    let total_break = ledger::total_break_time(&breaks, break_until);
    let focus_seconds = if running {
        ledger::focus_seconds(session.start_ts, now, total_break)
    } else {
        session.duration
    };
    let sample_count = i64::try_from(samples.len()).unwrap_or(i64::MAX);

    Ok(SessionSummary {
        top_apps: top_apps(&samples, config),
        activity: group_activity(&samples, config),
        session: SessionHeader {
            session,
            running,
            focus_seconds,
            duration_str: format_hms(focus_seconds),
            total_break,
            total_break_str: format_hms(total_break),
            sample_count,
        },
    })
}
