#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use studytrack_lib::{
    db::Database,
    sensing::{ProbeError, WindowInfo, WindowProbe},
    timer::TimerController,
    utils::ManualClock,
};
use tempfile::TempDir;

pub const T0: i64 = 1_700_000_000;

/// Probe whose answer is set by the test. `None` makes every query fail.
#[derive(Default)]
pub struct ScriptedProbe {
    answer: Mutex<Option<WindowInfo>>,
}

impl ScriptedProbe {
    pub fn answering(app_name: &str, window_title: &str) -> Self {
        Self {
            answer: Mutex::new(Some(WindowInfo::new(app_name, window_title))),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn set(&self, answer: Option<WindowInfo>) {
        *self.answer.lock().unwrap() = answer;
    }
}

impl WindowProbe for ScriptedProbe {
    fn query(&self) -> Result<WindowInfo, ProbeError> {
        self.answer
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ProbeError::Unavailable("scripted failure".into()))
    }
}

pub struct Harness {
    pub dir: TempDir,
    pub db: Database,
    pub clock: ManualClock,
    pub probe: Arc<ScriptedProbe>,
    pub timer: TimerController,
}

impl Harness {
    /// Sampler interval long enough that only the immediate first sample
    /// is ever taken during a test.
    pub fn new() -> Self {
        Self::with_interval(Duration::from_secs(3600))
    }

    pub fn with_interval(interval: Duration) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("studytrack.db")).unwrap();
        Self::reopen(dir, db, interval)
    }

    /// Builds a fresh controller over an existing database, as a restart would.
    pub fn reopen(dir: TempDir, db: Database, interval: Duration) -> Self {
        let clock = ManualClock::new(T0);
        let probe = Arc::new(ScriptedProbe::answering("kitty", "nvim"));
        let timer = TimerController::new(
            db.clone(),
            Arc::new(clock.clone()),
            probe.clone(),
            interval,
        );
        Self {
            dir,
            db,
            clock,
            probe,
            timer,
        }
    }

    /// Polls until the session has at least `min` activity rows.
    pub async fn wait_for_samples(&self, session_id: i64, min: i64) -> i64 {
        for _ in 0..200 {
            let count = self.db.count_activity_for_session(session_id).await.unwrap();
            if count >= min {
                return count;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("session {session_id} never reached {min} samples");
    }
}
