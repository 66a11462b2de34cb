//! System State Repository
//!
//! Per-venue key/value runtime rows (daily receipt sequence and similar
//! derived state). Cleared wholesale by the daily reset.

use super::RepoResult;
use sqlx::SqlitePool;

/// Atomically increment and return a named per-venue sequence.
///
/// Starts at 1 for an unknown key; the upsert keeps concurrent callers from
/// ever observing the same value.
pub async fn next_sequence(pool: &SqlitePool, venue_id: i64, key: &str, now: i64) -> RepoResult<i64> {
    let value: i64 = sqlx::query_scalar(
        "INSERT INTO system_state (venue_id, key, value, updated_at) VALUES (?, ?, '1', ?) \
         ON CONFLICT (venue_id, key) DO UPDATE SET \
         value = CAST(CAST(value AS INTEGER) + 1 AS TEXT), updated_at = excluded.updated_at \
         RETURNING CAST(value AS INTEGER)",
    )
    .bind(venue_id)
    .bind(key)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(value)
}

/// Daily reset step 4: clear the venue's derived runtime state
pub async fn clear_for_venue(pool: &SqlitePool, venue_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM system_state WHERE venue_id = ?")
        .bind(venue_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}
