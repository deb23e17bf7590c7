use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::error::StudyResult;

use super::{
    schemas::{
        DeleteResponse, SessionIdRequest, StartRequest, StartResponse, StatusResponse,
        StopResponse, TransitionResponse,
    },
    AppState,
};

pub async fn start_session(
    State(state): State<AppState>,
    payload: Result<Json<StartRequest>, JsonRejection>,
) -> StudyResult<Json<StartResponse>> {
    let Json(req) = payload?;
    let session = state
        .timer
        .start(&req.name, &req.tags, req.target_duration)
        .await?;
    Ok(Json(StartResponse {
        success: true,
        session,
    }))
}

pub async fn pause_session(
    State(state): State<AppState>,
    payload: Result<Json<SessionIdRequest>, JsonRejection>,
) -> StudyResult<Json<TransitionResponse>> {
    let session_id = payload?.require()?;
    let status = state.timer.pause(session_id).await?;
    Ok(Json(TransitionResponse {
        success: true,
        session_id,
        status,
    }))
}

pub async fn resume_session(
    State(state): State<AppState>,
    payload: Result<Json<SessionIdRequest>, JsonRejection>,
) -> StudyResult<Json<TransitionResponse>> {
    let session_id = payload?.require()?;
    let status = state.timer.resume(session_id).await?;
    Ok(Json(TransitionResponse {
        success: true,
        session_id,
        status,
    }))
}

pub async fn stop_session(
    State(state): State<AppState>,
    payload: Result<Json<SessionIdRequest>, JsonRejection>,
) -> StudyResult<Json<StopResponse>> {
    let session_id = payload?.require()?;
    let stopped = state.timer.stop(session_id).await?;
    Ok(Json(StopResponse {
        success: true,
        session_id,
        duration: stopped.session.duration,
        duration_str: crate::utils::format_hms(stopped.session.duration),
        total_break: stopped.total_break,
    }))
}

pub async fn timer_status(State(state): State<AppState>) -> StudyResult<Json<StatusResponse>> {
    let snapshot = state.timer.status().await?;
    Ok(Json(StatusResponse::from(snapshot)))
}

pub async fn delete_session(
    State(state): State<AppState>,
    payload: Result<Json<SessionIdRequest>, JsonRejection>,
) -> StudyResult<Json<DeleteResponse>> {
    let session_id = payload?.require()?;
    state.timer.delete(session_id).await?;
    Ok(Json(DeleteResponse {
        success: true,
        session_id,
    }))
}
