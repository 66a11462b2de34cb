//! Table Session Repository
//!
//! One open session (closed_at IS NULL) per table. Sessions are closed, not
//! deleted; callers open a fresh FREE session right after closing one.

use super::RepoResult;
use shared::models::{SessionStatus, TableSession};
use sqlx::{Sqlite, SqlitePool};

const COLUMNS: &str =
    "id, venue_id, table_id, order_id, status, customer_name, party_size, opened_at, closed_at";

pub async fn find_open_by_table<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    venue_id: i64,
    table_id: i64,
) -> RepoResult<Option<TableSession>> {
    let session = sqlx::query_as::<_, TableSession>(&format!(
        "SELECT {COLUMNS} FROM table_sessions \
         WHERE venue_id = ? AND table_id = ? AND closed_at IS NULL LIMIT 1"
    ))
    .bind(venue_id)
    .bind(table_id)
    .fetch_optional(exec)
    .await?;
    Ok(session)
}

pub async fn find_open_by_order<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    venue_id: i64,
    order_id: i64,
) -> RepoResult<Option<TableSession>> {
    let session = sqlx::query_as::<_, TableSession>(&format!(
        "SELECT {COLUMNS} FROM table_sessions \
         WHERE venue_id = ? AND order_id = ? AND closed_at IS NULL LIMIT 1"
    ))
    .bind(venue_id)
    .bind(order_id)
    .fetch_optional(exec)
    .await?;
    Ok(session)
}

pub async fn insert<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    session: &TableSession,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO table_sessions (id, venue_id, table_id, order_id, status, customer_name, \
         party_size, opened_at, closed_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(session.id)
    .bind(session.venue_id)
    .bind(session.table_id)
    .bind(session.order_id)
    .bind(session.status)
    .bind(&session.customer_name)
    .bind(session.party_size)
    .bind(session.opened_at)
    .bind(session.closed_at)
    .execute(exec)
    .await?;
    Ok(())
}

/// Close a session in its current state (merge bookkeeping, reseating)
pub async fn close<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    session_id: i64,
    now: i64,
) -> RepoResult<u64> {
    let rows =
        sqlx::query("UPDATE table_sessions SET closed_at = ? WHERE id = ? AND closed_at IS NULL")
            .bind(now)
            .bind(session_id)
            .execute(exec)
            .await?;
    Ok(rows.rows_affected())
}

/// Close a session as FREE: clear the order reference and stamp closed_at
pub async fn close_as_free<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    session_id: i64,
    now: i64,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE table_sessions SET status = 'FREE', order_id = NULL, closed_at = ? \
         WHERE id = ? AND closed_at IS NULL",
    )
    .bind(now)
    .bind(session_id)
    .execute(exec)
    .await?;
    Ok(rows.rows_affected())
}

/// In-place status transition of an open session
pub async fn update_status<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    session_id: i64,
    status: SessionStatus,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE table_sessions SET status = ? WHERE id = ? AND closed_at IS NULL",
    )
    .bind(status)
    .bind(session_id)
    .execute(exec)
    .await?;
    Ok(rows.rows_affected())
}

/// Attach an order to an open session and set its status
pub async fn attach_order<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    session_id: i64,
    order_id: i64,
    status: SessionStatus,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE table_sessions SET order_id = ?, status = ? WHERE id = ? AND closed_at IS NULL",
    )
    .bind(order_id)
    .bind(status)
    .bind(session_id)
    .execute(exec)
    .await?;
    Ok(rows.rows_affected())
}

/// Re-point an open session at another active order (table stays occupied)
pub async fn reassign_order<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    session_id: i64,
    order_id: Option<i64>,
) -> RepoResult<u64> {
    let rows =
        sqlx::query("UPDATE table_sessions SET order_id = ? WHERE id = ? AND closed_at IS NULL")
            .bind(order_id)
            .bind(session_id)
            .execute(exec)
            .await?;
    Ok(rows.rows_affected())
}

/// Daily reset step 3: drop all of the venue's sessions
pub async fn delete_all_for_venue(pool: &SqlitePool, venue_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM table_sessions WHERE venue_id = ?")
        .bind(venue_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}
