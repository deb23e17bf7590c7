use std::collections::BTreeSet;

use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{like_pattern, non_blank, to_i64},
    models::{session::split_tags, Break, NewSession, Session, SessionFilter},
};
use crate::ledger;

use super::breaks::{close_open_breaks_in, list_breaks_in};

const SESSION_COLUMNS: &str = "id, name, tags, start_ts, end_ts, duration, target_duration";

// Rows from the v1 single-table layout may carry NULLs.
fn row_to_session(row: &Row) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get("id")?,
        name: row.get::<_, Option<String>>("name")?.unwrap_or_default(),
        tags: row.get::<_, Option<String>>("tags")?.unwrap_or_default(),
        start_ts: row.get::<_, Option<i64>>("start_ts")?.unwrap_or_default(),
        end_ts: row.get::<_, Option<i64>>("end_ts")?.unwrap_or_default(),
        duration: row.get::<_, Option<i64>>("duration")?.unwrap_or_default(),
        target_duration: row.get("target_duration")?,
    })
}

/// Outcome of closing a session: the final record plus the break total that
/// went into its duration.
#[derive(Debug, Clone)]
pub struct StoppedSession {
    pub session: Session,
    pub total_break: i64,
}

impl Database {
    pub async fn insert_session(&self, session: &NewSession) -> Result<Session> {
        let record = session.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO sessions (name, tags, start_ts, end_ts, duration, target_duration)
                 VALUES (?1, ?2, ?3, 0, 0, ?4)",
                params![
                    record.name,
                    record.tags,
                    record.start_ts,
                    record.target_duration
                ],
            )
            .context("failed to insert session")?;

            Ok(Session {
                id: conn.last_insert_rowid(),
                name: record.name,
                tags: record.tags,
                start_ts: record.start_ts,
                end_ts: 0,
                duration: 0,
                target_duration: record.target_duration,
            })
        })
        .await
    }

    pub async fn get_session(&self, session_id: i64) -> Result<Option<Session>> {
        self.execute(move |conn| {
            let session = conn
                .query_row(
                    &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
                    params![session_id],
                    row_to_session,
                )
                .optional()
                .context("failed to load session")?;
            Ok(session)
        })
        .await
    }

    /// The most recently started session that has not been stopped.
    pub async fn get_open_session(&self) -> Result<Option<Session>> {
        self.execute(|conn| {
            let session = conn
                .query_row(
                    &format!(
                        "SELECT {SESSION_COLUMNS} FROM sessions
                         WHERE end_ts = 0
                         ORDER BY start_ts DESC, id DESC
                         LIMIT 1"
                    ),
                    [],
                    row_to_session,
                )
                .optional()
                .context("failed to load open session")?;
            Ok(session)
        })
        .await
    }

    pub async fn count_open_sessions(&self) -> Result<i64> {
        self.execute(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM sessions WHERE end_ts = 0",
                [],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
    }

    /// Closes any open break, computes the focus duration and writes
    /// `end_ts`/`duration` in one transaction. Returns `None` when the
    /// session does not exist or was already stopped; nothing is written then.
    pub async fn stop_session(&self, session_id: i64, now: i64) -> Result<Option<StoppedSession>> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            let session = tx
                .query_row(
                    &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1 AND end_ts = 0"),
                    params![session_id],
                    row_to_session,
                )
                .optional()?;
            let Some(mut session) = session else {
                return Ok(None);
            };

            close_open_breaks_in(&tx, session_id, now)?;
            let breaks: Vec<Break> = list_breaks_in(&tx, session_id)?;
            let total_break = ledger::total_break_time(&breaks, now);
            let duration = ledger::focus_seconds(session.start_ts, now, total_break);

            tx.execute(
                "UPDATE sessions SET end_ts = ?1, duration = ?2 WHERE id = ?3 AND end_ts = 0",
                params![now, duration, session_id],
            )
            .context("failed to finalize session")?;
            tx.commit()?;

            session.end_ts = now;
            session.duration = duration;
            Ok(Some(StoppedSession {
                session,
                total_break,
            }))
        })
        .await
    }

    pub async fn recent_sessions(&self, limit: usize) -> Result<Vec<Session>> {
        self.list_sessions(&SessionFilter {
            limit: Some(limit),
            ..SessionFilter::default()
        })
        .await
    }

    /// Newest first. `name` and `tag` are case-insensitive substring filters.
    pub async fn list_sessions(&self, filter: &SessionFilter) -> Result<Vec<Session>> {
        let name = non_blank(filter.name.as_deref()).map(like_pattern);
        let tag = non_blank(filter.tag.as_deref()).map(like_pattern);
        let limit = filter.limit.map(to_i64).transpose()?.unwrap_or(-1);

        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions
                 WHERE (?1 IS NULL OR name LIKE ?1 ESCAPE '\\')
                   AND (?2 IS NULL OR tags LIKE ?2 ESCAPE '\\')
                 ORDER BY start_ts DESC, id DESC
                 LIMIT ?3"
            ))?;

            let sessions = stmt
                .query_map(params![name, tag, limit], row_to_session)?
                .collect::<Result<Vec<_>, _>>()
                .context("failed to list sessions")?;
            Ok(sessions)
        })
        .await
    }

    /// Stopped sessions whose `start_ts` lies in `[from_ts, to_ts)`.
    pub async fn list_closed_sessions_between(&self, from_ts: i64, to_ts: i64) -> Result<Vec<Session>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions
                 WHERE end_ts != 0 AND start_ts >= ?1 AND start_ts < ?2
                 ORDER BY start_ts ASC"
            ))?;

            let sessions = stmt
                .query_map(params![from_ts, to_ts], row_to_session)?
                .collect::<Result<Vec<_>, _>>()
                .context("failed to list sessions in range")?;
            Ok(sessions)
        })
        .await
    }

    /// Sorted, de-duplicated set of every tag used by any session.
    pub async fn list_tags(&self) -> Result<Vec<String>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare("SELECT tags FROM sessions WHERE tags IS NOT NULL AND tags != ''")?;
            let mut rows = stmt.query([])?;

            let mut tags = BTreeSet::new();
            while let Some(row) = rows.next()? {
                let raw: String = row.get(0)?;
                tags.extend(split_tags(&raw));
            }

            Ok(tags.into_iter().collect())
        })
        .await
    }

    /// Deletes a session; breaks and activity rows go with it through
    /// `ON DELETE CASCADE`. Returns whether a row was removed.
    pub async fn delete_session(&self, session_id: i64) -> Result<bool> {
        self.execute(move |conn| {
            let rows_affected = conn
                .execute("DELETE FROM sessions WHERE id = ?1", params![session_id])
                .context("failed to delete session")?;
            Ok(rows_affected > 0)
        })
        .await
    }
}
