use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{connection::Database, models::Break};
use crate::ledger;

fn row_to_break(row: &Row) -> rusqlite::Result<Break> {
    Ok(Break {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        pause_ts: row.get("pause_ts")?,
        resume_ts: row.get("resume_ts")?,
    })
}

pub(crate) fn list_breaks_in(conn: &Connection, session_id: i64) -> Result<Vec<Break>> {
    let mut stmt = conn.prepare(
        "SELECT id, session_id, pause_ts, resume_ts
         FROM breaks
         WHERE session_id = ?1
         ORDER BY pause_ts ASC, id ASC",
    )?;

    let breaks = stmt
        .query_map(params![session_id], row_to_break)?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to load breaks")?;
    Ok(breaks)
}

pub(crate) fn close_open_breaks_in(conn: &Connection, session_id: i64, resume_ts: i64) -> Result<usize> {
    conn.execute(
        "UPDATE breaks SET resume_ts = ?1 WHERE session_id = ?2 AND resume_ts IS NULL",
        params![resume_ts, session_id],
    )
    .context("failed to close open breaks")
}

impl Database {
    /// Closes whatever break is still open for the session, then records a
    /// new one starting at `pause_ts`. Both writes share one transaction, so a
    /// session never ends up with two open breaks.
    pub async fn open_break(&self, session_id: i64, pause_ts: i64) -> Result<Break> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            close_open_breaks_in(&tx, session_id, pause_ts)?;
            tx.execute(
                "INSERT INTO breaks (session_id, pause_ts, resume_ts) VALUES (?1, ?2, NULL)",
                params![session_id, pause_ts],
            )
            .context("failed to insert break")?;
            let id = tx.last_insert_rowid();
            tx.commit()?;

            Ok(Break {
                id,
                session_id,
                pause_ts,
                resume_ts: None,
            })
        })
        .await
    }

    /// Returns the number of breaks that were closed.
    pub async fn close_open_breaks(&self, session_id: i64, resume_ts: i64) -> Result<usize> {
        self.execute(move |conn| close_open_breaks_in(conn, session_id, resume_ts))
            .await
    }

    pub async fn get_open_break(&self, session_id: i64) -> Result<Option<Break>> {
        self.execute(move |conn| {
            let open = conn
                .query_row(
                    "SELECT id, session_id, pause_ts, resume_ts
                     FROM breaks
                     WHERE session_id = ?1 AND resume_ts IS NULL
                     ORDER BY pause_ts DESC
                     LIMIT 1",
                    params![session_id],
                    row_to_break,
                )
                .optional()
                .context("failed to load open break")?;
            Ok(open)
        })
        .await
    }

    pub async fn list_breaks(&self, session_id: i64) -> Result<Vec<Break>> {
        self.execute(move |conn| list_breaks_in(conn, session_id))
            .await
    }

    pub async fn total_break_time(&self, session_id: i64, now: i64) -> Result<i64> {
        let breaks = self.list_breaks(session_id).await?;
        Ok(ledger::total_break_time(&breaks, now))
    }
}
