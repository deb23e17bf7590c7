//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};

use crate::{
    db::Session,
    error::{StudyError, StudyResult},
    timer::{TimerSnapshot, TimerStatus},
    utils::format_hms,
};

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: String,
    pub target_duration: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SessionIdRequest {
    pub session_id: Option<i64>,
}

impl SessionIdRequest {
    pub fn require(&self) -> StudyResult<i64> {
        self.session_id
            .ok_or_else(|| StudyError::validation("session_id", "session_id is required"))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionListQuery {
    pub name: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub success: bool,
    pub session: Session,
}

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub success: bool,
    pub session_id: i64,
    pub status: TimerStatus,
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub success: bool,
    pub session_id: i64,
    pub duration: i64,
    pub duration_str: String,
    pub total_break: i64,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub session_id: i64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub running: bool,
    pub status: TimerStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
    pub elapsed: i64,
    pub elapsed_str: String,
    pub is_countdown: bool,
    pub remaining: Option<i64>,
    pub total_break: i64,
}

impl From<TimerSnapshot> for StatusResponse {
    fn from(snapshot: TimerSnapshot) -> Self {
        Self {
            running: snapshot.is_active(),
            status: snapshot.status,
            elapsed_str: snapshot.display_str(),
            elapsed: snapshot.elapsed,
            is_countdown: snapshot.is_countdown,
            remaining: snapshot.remaining,
            total_break: snapshot.total_break,
            session: snapshot.session,
        }
    }
}

/// One row of the session history lists.
#[derive(Debug, Serialize)]
pub struct SessionListItem {
    pub id: i64,
    pub name: String,
    pub tags: String,
    pub start_ts: i64,
    pub end_ts: i64,
    pub duration: i64,
    pub duration_str: String,
    pub target_duration: i64,
    pub running: bool,
}

impl From<Session> for SessionListItem {
    fn from(session: Session) -> Self {
        Self {
            running: session.is_open(),
            duration_str: format_hms(session.duration),
            id: session.id,
            name: session.name,
            tags: session.tags,
            start_ts: session.start_ts,
            end_ts: session.end_ts,
            duration: session.duration,
            target_duration: session.target_duration,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionListItem>,
}

impl From<Vec<Session>> for SessionListResponse {
    fn from(sessions: Vec<Session>) -> Self {
        Self {
            sessions: sessions.into_iter().map(SessionListItem::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}
