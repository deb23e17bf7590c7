//! JSON-over-HTTP surface.

pub mod error;
pub mod history;
pub mod schemas;
pub mod sessions;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate, TimeZone};

use crate::{db::Database, grouping::GroupingConfig, timer::TimerController, utils::Clock};

use schemas::HealthResponse;

#[derive(Clone)]
pub struct AppState {
    pub timer: TimerController,
    pub db: Database,
    pub clock: Arc<dyn Clock>,
    pub grouping: GroupingConfig,
}

impl AppState {
    pub fn new(timer: TimerController) -> Self {
        let interval_secs = i64::try_from(timer.sample_interval().as_secs()).unwrap_or(i64::MAX);
        Self {
            db: timer.db().clone(),
            clock: Arc::clone(timer.clock()),
            grouping: GroupingConfig::with_interval(interval_secs),
            timer,
        }
    }

    /// Today's date in the local timezone, by the injected clock.
    pub fn local_today(&self) -> NaiveDate {
        Local
            .timestamp_opt(self.clock.now(), 0)
            .single()
            .map(|moment| moment.date_naive())
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: "studytrack",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/start", post(sessions::start_session))
        .route("/api/pause", post(sessions::pause_session))
        .route("/api/resume", post(sessions::resume_session))
        .route("/api/stop", post(sessions::stop_session))
        .route("/api/status", get(sessions::timer_status))
        .route("/api/session/delete", post(sessions::delete_session))
        .route("/api/recent", get(history::recent_sessions))
        .route("/api/all_sessions", get(history::all_sessions))
        .route("/api/session/{id}/summary", get(history::session_summary))
        .route("/api/tags", get(history::list_tags))
        .route("/api/analytics/summary", get(history::analytics_summary))
        .with_state(state)
}
