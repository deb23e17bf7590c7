pub mod activity_log;
pub mod breaks;
pub mod sessions;

pub use sessions::StoppedSession;
