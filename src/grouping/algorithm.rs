use std::collections::HashMap;

use serde::Serialize;

use crate::{db::ActivitySample, utils::format_hms};

use super::{config::GroupingConfig, title::clean_title};

/// Samples sharing an application and a cleaned title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityGroup {
    pub app_name: String,
    pub window_title: String,
    pub sample_count: i64,
    pub duration: i64,
    pub duration_str: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppUsage {
    pub app_name: String,
    pub sample_count: i64,
    pub duration: i64,
    pub duration_str: String,
}

impl AppUsage {
    pub fn from_count(app_name: impl Into<String>, sample_count: i64, interval_secs: i64) -> Self {
        let duration = sample_count * interval_secs;
        Self {
            app_name: app_name.into(),
            sample_count,
            duration,
            duration_str: format_hms(duration),
        }
    }
}

/// Counts occurrences of `key` in first-appearance order.
fn count_in_order<K, I>(keys: I) -> Vec<(K, i64)>
where
    K: Eq + std::hash::Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, i64)> = Vec::new();

    for key in keys {
        match index.get(&key) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }

    counts
}

/// Groups a session's samples by `(app_name, cleaned title)`, largest first.
/// Groups of equal size keep the order in which they first appeared.
pub fn group_activity(samples: &[ActivitySample], config: &GroupingConfig) -> Vec<ActivityGroup> {
    let mut counts = count_in_order(samples.iter().map(|sample| {
        (
            sample.app_name.clone(),
            clean_title(&sample.app_name, &sample.window_title),
        )
    }));
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .map(|((app_name, window_title), sample_count)| {
            let duration = sample_count * config.sample_interval_secs;
            ActivityGroup {
                app_name,
                window_title,
                sample_count,
                duration,
                duration_str: format_hms(duration),
            }
        })
        .filter(|group| group.duration > 0)
        .collect()
}

/// Applications ranked by raw sample count, titles ignored.
pub fn top_apps(samples: &[ActivitySample], config: &GroupingConfig) -> Vec<AppUsage> {
    let mut counts = count_in_order(samples.iter().map(|sample| sample.app_name.clone()));
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    rank_app_counts(counts, config)
}

/// Turns pre-sorted `(app, count)` pairs into the top-apps list.
pub fn rank_app_counts(counts: Vec<(String, i64)>, config: &GroupingConfig) -> Vec<AppUsage> {
    counts
        .into_iter()
        .take(config.top_apps_limit)
        .map(|(app_name, count)| AppUsage::from_count(app_name, count, config.sample_interval_secs))
        .collect()
}
