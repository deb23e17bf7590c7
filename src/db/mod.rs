pub mod connection;
pub mod helpers;
mod migrations;
pub mod models;
pub mod repositories;

pub use connection::Database;
pub use models::{
    normalize_tags, split_tags, ActivitySample, Break, NewSession, Session, SessionFilter,
};
pub use repositories::StoppedSession;
