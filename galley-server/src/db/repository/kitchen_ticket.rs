//! Kitchen Ticket Repository

use super::RepoResult;
use shared::models::{KitchenTicket, TicketStatus};
use sqlx::{Sqlite, SqlitePool};

const COLUMNS: &str = "id, venue_id, order_id, station, status, created_at, updated_at";

pub async fn find_by_id<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    venue_id: i64,
    id: i64,
) -> RepoResult<Option<KitchenTicket>> {
    let ticket = sqlx::query_as::<_, KitchenTicket>(&format!(
        "SELECT {COLUMNS} FROM kitchen_tickets WHERE id = ? AND venue_id = ?"
    ))
    .bind(id)
    .bind(venue_id)
    .fetch_optional(exec)
    .await?;
    Ok(ticket)
}

/// All tickets for an order. Readiness decisions always re-read through this
/// (full fresh set, never a delta).
pub async fn find_by_order<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    order_id: i64,
) -> RepoResult<Vec<KitchenTicket>> {
    let tickets = sqlx::query_as::<_, KitchenTicket>(&format!(
        "SELECT {COLUMNS} FROM kitchen_tickets WHERE order_id = ? ORDER BY id"
    ))
    .bind(order_id)
    .fetch_all(exec)
    .await?;
    Ok(tickets)
}

pub async fn insert<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    ticket: &KitchenTicket,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO kitchen_tickets (id, venue_id, order_id, station, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(ticket.id)
    .bind(ticket.venue_id)
    .bind(ticket.order_id)
    .bind(&ticket.station)
    .bind(ticket.status)
    .bind(ticket.created_at)
    .bind(ticket.updated_at)
    .execute(exec)
    .await?;
    Ok(())
}

/// Set one ticket's status. Returns rows affected (0 = unknown ticket in
/// this venue).
pub async fn update_status<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    venue_id: i64,
    id: i64,
    status: TicketStatus,
    now: i64,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE kitchen_tickets SET status = ?, updated_at = ? WHERE id = ? AND venue_id = ?",
    )
    .bind(status)
    .bind(now)
    .bind(id)
    .bind(venue_id)
    .execute(exec)
    .await?;
    Ok(rows.rows_affected())
}

/// Force reset: delete all of the venue's tickets
pub async fn delete_all_for_venue(pool: &SqlitePool, venue_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM kitchen_tickets WHERE venue_id = ?")
        .bind(venue_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}
