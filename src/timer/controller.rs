use std::sync::Arc;

use log::{info, warn};
use tokio::{sync::Mutex, time::Duration};

use crate::{
    db::{normalize_tags, Database, NewSession, Session, StoppedSession},
    error::{StudyError, StudyResult},
    sensing::{SamplerContext, SensingController, WindowProbe},
    utils::Clock,
};

use super::{TimerSnapshot, TimerStatus};

/// Drives the session lifecycle. All state lives in the database; the only
/// in-memory state is the sampler handle. Every transition holds the
/// `sensing` lock from its first read to its last write, so transitions
/// never interleave.
#[derive(Clone)]
pub struct TimerController {
    db: Database,
    clock: Arc<dyn Clock>,
    probe: Arc<dyn WindowProbe>,
    sample_interval: Duration,
    sensing: Arc<Mutex<SensingController>>,
}

impl TimerController {
    pub fn new(
        db: Database,
        clock: Arc<dyn Clock>,
        probe: Arc<dyn WindowProbe>,
        sample_interval: Duration,
    ) -> Self {
        Self {
            db,
            clock,
            probe,
            sample_interval,
            sensing: Arc::new(Mutex::new(SensingController::new())),
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn sample_interval(&self) -> Duration {
        self.sample_interval
    }

    /// Session the activity sampler is currently bound to.
    pub async fn sampler_session(&self) -> Option<i64> {
        self.sensing.lock().await.active_session()
    }

    fn sampler_context(&self, session_id: i64) -> SamplerContext {
        SamplerContext {
            session_id,
            db: self.db.clone(),
            probe: Arc::clone(&self.probe),
            clock: Arc::clone(&self.clock),
            interval: self.sample_interval,
        }
    }

    /// Opens a new session and starts sampling for it. `target_duration` of
    /// zero (or none) makes a stopwatch session.
    pub async fn start(
        &self,
        name: &str,
        tags: &str,
        target_duration: Option<i64>,
    ) -> StudyResult<Session> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StudyError::validation("name", "session name must not be empty"));
        }
        let target_duration = target_duration.unwrap_or(0);
        if target_duration < 0 {
            return Err(StudyError::validation(
                "target_duration",
                "target duration must not be negative",
            ));
        }

        let mut sensing = self.sensing.lock().await;

        if let Some(open) = self.db.get_open_session().await? {
            return Err(StudyError::conflict(format!(
                "session {} is already in progress",
                open.id
            )));
        }

        let session = self
            .db
            .insert_session(&NewSession {
                name: name.to_string(),
                tags: normalize_tags(tags),
                start_ts: self.clock.now(),
                target_duration,
            })
            .await?;

        sensing.start_sensing(self.sampler_context(session.id)).await;

        info!(
            "started session {} '{}' (target {}s)",
            session.id, session.name, session.target_duration
        );
        Ok(session)
    }

    /// Opens a break. Pausing a session that is already paused changes nothing.
    pub async fn pause(&self, session_id: i64) -> StudyResult<TimerStatus> {
        let mut sensing = self.sensing.lock().await;
        self.require_open(session_id).await?;

        if sensing.active_session() == Some(session_id) {
            sensing.stop_sensing().await;
        }

        if self.db.get_open_break(session_id).await?.is_some() {
            return Ok(TimerStatus::Paused);
        }

        let record = self.db.open_break(session_id, self.clock.now()).await?;
        info!("paused session {session_id} at {}", record.pause_ts);
        Ok(TimerStatus::Paused)
    }

    /// Closes the open break and restarts sampling. Resuming a running
    /// session changes nothing, apart from restarting a sampler that is
    /// missing.
    pub async fn resume(&self, session_id: i64) -> StudyResult<TimerStatus> {
        let mut sensing = self.sensing.lock().await;
        self.require_open(session_id).await?;

        let closed = self
            .db
            .close_open_breaks(session_id, self.clock.now())
            .await?;

        if closed == 0 && sensing.active_session() == Some(session_id) {
            return Ok(TimerStatus::Running);
        }

        sensing
            .start_sensing(self.sampler_context(session_id))
            .await;

        if closed > 0 {
            info!("resumed session {session_id}");
        } else {
            warn!("session {session_id} was running without a sampler; restarted it");
        }
        Ok(TimerStatus::Running)
    }

    /// Finalizes the session: closes any open break and writes `end_ts` and
    /// the focus duration exactly once.
    pub async fn stop(&self, session_id: i64) -> StudyResult<StoppedSession> {
        let mut sensing = self.sensing.lock().await;

        let session = self
            .db
            .get_session(session_id)
            .await?
            .ok_or(StudyError::SessionNotFound(session_id))?;
        if !session.is_open() {
            return Err(StudyError::conflict(format!(
                "session {session_id} is already stopped"
            )));
        }

        if sensing.active_session() == Some(session_id) {
            sensing.stop_sensing().await;
        }

        let stopped = self
            .db
            .stop_session(session_id, self.clock.now())
            .await?
            .ok_or_else(|| {
                StudyError::conflict(format!("session {session_id} is already stopped"))
            })?;

        info!(
            "stopped session {} after {}s focus ({}s on break)",
            session_id, stopped.session.duration, stopped.total_break
        );
        Ok(stopped)
    }

    /// Current timer state. A sampler left running for a session that is no
    /// longer the open one is torn down here.
    pub async fn status(&self) -> StudyResult<TimerSnapshot> {
        let mut sensing = self.sensing.lock().await;

        let Some(session) = self.db.get_open_session().await? else {
            if let Some(stale) = sensing.stop_sensing().await {
                warn!("stopped dangling sampler of session {stale}");
            }
            return Ok(TimerSnapshot::idle());
        };

        if let Some(active) = sensing.active_session() {
            if active != session.id {
                sensing.stop_sensing().await;
                warn!("stopped sampler of session {active}; session {} is open", session.id);
            }
        }

        let breaks = self.db.list_breaks(session.id).await?;
        Ok(TimerSnapshot::compute(session, &breaks, self.clock.now()))
    }

    /// Removes a session with its breaks and activity rows. Deleting the
    /// open session stops its sampler first.
    pub async fn delete(&self, session_id: i64) -> StudyResult<()> {
        let mut sensing = self.sensing.lock().await;

        if self.db.get_session(session_id).await?.is_none() {
            return Err(StudyError::SessionNotFound(session_id));
        }

        if sensing.active_session() == Some(session_id) {
            sensing.stop_sensing().await;
        }

        if !self.db.delete_session(session_id).await? {
            return Err(StudyError::SessionNotFound(session_id));
        }

        info!("deleted session {session_id}");
        Ok(())
    }

    /// Restarts sampling for a session left running by a previous process.
    /// Returns the status of the open session, if there is one.
    pub async fn recover(&self) -> StudyResult<Option<TimerStatus>> {
        let mut sensing = self.sensing.lock().await;

        let open_count = self.db.count_open_sessions().await?;
        if open_count > 1 {
            warn!("{open_count} sessions are open; only the newest is tracked");
        }

        let Some(session) = self.db.get_open_session().await? else {
            return Ok(None);
        };

        if self.db.get_open_break(session.id).await?.is_some() {
            info!("session {} is paused; sampler stays off", session.id);
            return Ok(Some(TimerStatus::Paused));
        }

        sensing
            .start_sensing(self.sampler_context(session.id))
            .await;
        info!("resumed sampling for session {} after restart", session.id);
        Ok(Some(TimerStatus::Running))
    }

    /// Stops the sampler without touching any session. Used on shutdown.
    pub async fn shutdown(&self) {
        if let Some(session_id) = self.sensing.lock().await.stop_sensing().await {
            info!("sampler of session {session_id} stopped for shutdown");
        }
    }

    async fn require_open(&self, session_id: i64) -> StudyResult<Session> {
        let session = self
            .db
            .get_session(session_id)
            .await?
            .ok_or(StudyError::SessionNotFound(session_id))?;
        if !session.is_open() {
            return Err(StudyError::conflict(format!(
                "session {session_id} is already stopped"
            )));
        }

        match self.db.get_open_session().await? {
            Some(open) if open.id == session_id => Ok(session),
            _ => Err(StudyError::conflict(format!(
                "session {session_id} is not the active session"
            ))),
        }
    }
}
