//! Reservation Repository

use super::RepoResult;
use shared::models::{CompletionReason, Reservation, ReservationStatus};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, venue_id, table_id, status, customer_name, party_size, start_at, end_at, completed_reason, created_at, updated_at";

pub async fn find_by_id(
    pool: &SqlitePool,
    venue_id: i64,
    id: i64,
) -> RepoResult<Option<Reservation>> {
    let reservation = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {COLUMNS} FROM reservations WHERE id = ? AND venue_id = ?"
    ))
    .bind(id)
    .bind(venue_id)
    .fetch_optional(pool)
    .await?;
    Ok(reservation)
}

/// BOOKED and CHECKED_IN reservations, oldest first (sweep input)
pub async fn find_active(pool: &SqlitePool, venue_id: i64) -> RepoResult<Vec<Reservation>> {
    let reservations = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {COLUMNS} FROM reservations \
         WHERE venue_id = ? AND status IN ('BOOKED', 'CHECKED_IN') ORDER BY start_at"
    ))
    .bind(venue_id)
    .fetch_all(pool)
    .await?;
    Ok(reservations)
}

pub async fn insert(pool: &SqlitePool, reservation: &Reservation) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO reservations (id, venue_id, table_id, status, customer_name, party_size, \
         start_at, end_at, completed_reason, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(reservation.id)
    .bind(reservation.venue_id)
    .bind(reservation.table_id)
    .bind(reservation.status)
    .bind(reservation.customer_name.as_str())
    .bind(reservation.party_size)
    .bind(reservation.start_at)
    .bind(reservation.end_at)
    .bind(reservation.completed_reason)
    .bind(reservation.created_at)
    .bind(reservation.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Conditional status transition
pub async fn update_status(
    pool: &SqlitePool,
    venue_id: i64,
    id: i64,
    from: ReservationStatus,
    to: ReservationStatus,
    now: i64,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE reservations SET status = ?, updated_at = ? \
         WHERE id = ? AND venue_id = ? AND status = ?",
    )
    .bind(to)
    .bind(now)
    .bind(id)
    .bind(venue_id)
    .bind(from)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

/// Seat the party: BOOKED -> CHECKED_IN with a table assigned
pub async fn check_in(
    pool: &SqlitePool,
    venue_id: i64,
    id: i64,
    table_id: i64,
    now: i64,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE reservations SET status = 'CHECKED_IN', table_id = ?, updated_at = ? \
         WHERE id = ? AND venue_id = ? AND status = 'BOOKED'",
    )
    .bind(table_id)
    .bind(now)
    .bind(id)
    .bind(venue_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

/// Auto-complete with its audit reason, conditioned on still being active
pub async fn complete_with_reason(
    pool: &SqlitePool,
    venue_id: i64,
    id: i64,
    reason: CompletionReason,
    now: i64,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE reservations SET status = 'COMPLETED', completed_reason = ?, updated_at = ? \
         WHERE id = ? AND venue_id = ? AND status IN ('BOOKED', 'CHECKED_IN')",
    )
    .bind(reason)
    .bind(now)
    .bind(id)
    .bind(venue_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

/// Daily reset step 2: cancel every BOOKED reservation
pub async fn cancel_all_booked(pool: &SqlitePool, venue_id: i64, now: i64) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE reservations SET status = 'CANCELLED', updated_at = ? \
         WHERE venue_id = ? AND status = 'BOOKED'",
    )
    .bind(now)
    .bind(venue_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}
