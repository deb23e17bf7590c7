//! Activity log data model.
//!
//! One row per sampling tick while a session is running. Rows are never
//! updated; they disappear only when their session is deleted.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySample {
    pub id: Option<i64>,
    pub session_id: i64,
    pub timestamp: i64,
    pub app_name: String,
    pub window_title: String,
}
