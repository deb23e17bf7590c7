use serde::{Deserialize, Serialize};

/// One pause interval of a session. `resume_ts` stays `None` while the
/// pause is ongoing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Break {
    pub id: i64,
    pub session_id: i64,
    pub pause_ts: i64,
    pub resume_ts: Option<i64>,
}

impl Break {
    pub fn is_open(&self) -> bool {
        self.resume_ts.is_none()
    }
}
