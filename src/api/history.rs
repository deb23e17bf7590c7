use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    Json,
};

use crate::{
    analytics::{self, AnalyticsQuery, AnalyticsReport, SessionSummary},
    db::SessionFilter,
    error::StudyResult,
};

use super::{
    schemas::{SessionListQuery, SessionListResponse, TagsResponse},
    AppState,
};

pub const RECENT_LIMIT: usize = 10;

pub async fn recent_sessions(
    State(state): State<AppState>,
) -> StudyResult<Json<SessionListResponse>> {
    let sessions = state.db.recent_sessions(RECENT_LIMIT).await?;
    Ok(Json(sessions.into()))
}

pub async fn all_sessions(
    State(state): State<AppState>,
    Query(query): Query<SessionListQuery>,
) -> StudyResult<Json<SessionListResponse>> {
    let filter = SessionFilter {
        name: query.name,
        tag: query.tag,
        limit: None,
    };
    let sessions = state.db.list_sessions(&filter).await?;
    Ok(Json(sessions.into()))
}

pub async fn session_summary(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> StudyResult<Json<SessionSummary>> {
    let Path(session_id) = id?;
    let summary =
        analytics::session_summary(&state.db, session_id, state.clock.now(), &state.grouping)
            .await?;
    Ok(Json(summary))
}

pub async fn list_tags(State(state): State<AppState>) -> StudyResult<Json<TagsResponse>> {
    let tags = state.db.list_tags().await?;
    Ok(Json(TagsResponse { tags }))
}

pub async fn analytics_summary(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> StudyResult<Json<AnalyticsReport>> {
    let today = state.local_today();
    let report =
        analytics::analytics_report(&state.db, &query, today, &chrono::Local, &state.grouping)
            .await?;
    Ok(Json(report))
}
