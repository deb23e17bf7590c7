/// Knobs for turning raw activity samples into reported time.
#[derive(Debug, Clone)]
pub struct GroupingConfig {
    /// Seconds one sample stands for. Matches the sampler's interval.
    pub sample_interval_secs: i64,

    /// How many applications the top-apps list keeps.
    pub top_apps_limit: usize,
}

impl GroupingConfig {
    pub fn with_interval(sample_interval_secs: i64) -> Self {
        Self {
            sample_interval_secs,
            ..Self::default()
        }
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            sample_interval_secs: 1,
            top_apps_limit: 5,
        }
    }
}
