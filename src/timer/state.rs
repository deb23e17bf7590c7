use serde::{Deserialize, Serialize};

use crate::{
    db::{Break, Session},
    ledger,
    utils::format_hms,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Paused,
}

impl TimerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
        }
    }
}

/// Point-in-time view of the timer, derived entirely from persisted rows.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub session: Option<Session>,
    /// Focus seconds so far.
    pub elapsed: i64,
    /// Countdown sessions only, never negative.
    pub remaining: Option<i64>,
    pub total_break: i64,
    pub is_countdown: bool,
}

impl TimerSnapshot {
    pub fn idle() -> Self {
        Self {
            status: TimerStatus::Idle,
            session: None,
            elapsed: 0,
            remaining: None,
            total_break: 0,
            is_countdown: false,
        }
    }

    /// Builds the snapshot of an open session. The session counts as paused
    /// while any of its breaks is unresolved.
    pub fn compute(session: Session, breaks: &[Break], now: i64) -> Self {
        let total_break = ledger::total_break_time(breaks, now);
        let elapsed = ledger::focus_seconds(session.start_ts, now, total_break);
        let status = if breaks.iter().any(Break::is_open) {
            TimerStatus::Paused
        } else {
            TimerStatus::Running
        };
        let is_countdown = session.is_countdown();
        let remaining = is_countdown.then(|| (session.target_duration - elapsed).max(0));

        Self {
            status,
            session: Some(session),
            elapsed,
            remaining,
            total_break,
            is_countdown,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status != TimerStatus::Idle
    }

    pub fn session_id(&self) -> Option<i64> {
        self.session.as_ref().map(|session| session.id)
    }

    /// Remaining time for countdowns, elapsed focus time otherwise.
    pub fn display_seconds(&self) -> i64 {
        self.remaining.unwrap_or(self.elapsed)
    }

    pub fn display_str(&self) -> String {
        format_hms(self.display_seconds())
    }
}
