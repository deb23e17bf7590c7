use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter};

use crate::db::{connection::Database, helpers::placeholders, models::ActivitySample};

impl Database {
    pub async fn insert_activity_sample(&self, sample: &ActivitySample) -> Result<i64> {
        let record = sample.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO activity_log (session_id, timestamp, app_name, window_title)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.session_id,
                    record.timestamp,
                    record.app_name,
                    record.window_title,
                ],
            )
            .context("failed to insert activity sample")?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    /// All samples of a session in capture order.
    pub async fn get_activity_for_session(&self, session_id: i64) -> Result<Vec<ActivitySample>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, timestamp, app_name, window_title
                 FROM activity_log
                 WHERE session_id = ?1
                 ORDER BY timestamp ASC, id ASC",
            )?;

            let samples = stmt
                .query_map(params![session_id], |row| {
                    Ok(ActivitySample {
                        id: row.get(0)?,
                        session_id: row.get(1)?,
                        timestamp: row.get(2)?,
                        app_name: row.get(3)?,
                        window_title: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()
                .context("failed to load activity samples")?;
            Ok(samples)
        })
        .await
    }

    pub async fn count_activity_for_session(&self, session_id: i64) -> Result<i64> {
        self.execute(move |conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM activity_log WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
    }

    /// Sample counts per application across the given sessions, highest
    /// first. Ties are broken by application name.
    pub async fn app_sample_counts(&self, session_ids: &[i64]) -> Result<Vec<(String, i64)>> {
        let session_ids = session_ids.to_vec();
        self.execute(move |conn| {
            if session_ids.is_empty() {
                return Ok(Vec::new());
            }

            let query = format!(
                "SELECT app_name, COUNT(*) AS samples
                 FROM activity_log
                 WHERE session_id IN ({})
                 GROUP BY app_name
                 ORDER BY samples DESC, app_name ASC",
                placeholders(session_ids.len())
            );

            let mut stmt = conn.prepare(&query)?;
            let counts = stmt
                .query_map(params_from_iter(session_ids.iter()), |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()
                .context("failed to aggregate activity by app")?;
            Ok(counts)
        })
        .await
    }
}
