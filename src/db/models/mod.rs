pub mod activity;
pub mod break_record;
pub mod session;

pub use activity::ActivitySample;
pub use break_record::Break;
pub use session::{normalize_tags, split_tags, NewSession, Session, SessionFilter};
