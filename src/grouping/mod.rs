pub mod algorithm;
pub mod config;
pub mod title;

pub use algorithm::{group_activity, rank_app_counts, top_apps, ActivityGroup, AppUsage};
pub use config::GroupingConfig;
pub use title::clean_title;
