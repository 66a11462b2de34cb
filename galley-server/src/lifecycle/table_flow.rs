//! Table Session Manager
//!
//! A table has exactly one open session; sessions are closed and reopened
//! rather than mutated through their whole life, so the floor view only ever
//! queries `closed_at IS NULL`. Releasing a table re-checks the table's
//! active orders first; the session being closed is never assumed to be the
//! only reason the table was occupied.

use crate::auth::Operator;
use crate::db::repository::{dining_table, order as order_repo, table_session};
use shared::models::{
    DiningTableCreate, OpenSessionRequest, SessionStatus, TableSession, TableWithSession,
};
use shared::util::{now_millis, snowflake_id};
use shared::{AppError, AppResult, ErrorCode};
use sqlx::SqlitePool;

/// Build a fresh open session row
pub(crate) fn new_session(venue_id: i64, table_id: i64, status: SessionStatus) -> TableSession {
    TableSession {
        id: snowflake_id(),
        venue_id,
        table_id,
        order_id: None,
        status,
        customer_name: None,
        party_size: None,
        opened_at: now_millis(),
        closed_at: None,
    }
}

/// Add a table to the venue floor and open its initial FREE session.
///
/// The daily reset drops the whole layout, so tables are recreated each
/// morning through this path.
pub async fn create_table(
    pool: &SqlitePool,
    op: &Operator,
    data: DiningTableCreate,
) -> AppResult<TableWithSession> {
    if data.label.trim().is_empty() {
        return Err(AppError::validation("table label must not be empty"));
    }
    if let Some(seats) = data.seat_count
        && !(1..=128).contains(&seats)
    {
        return Err(AppError::validation(format!("seat_count out of range: {seats}")));
    }

    let table = dining_table::create(pool, op.venue_id, data).await?;
    let session = new_session(op.venue_id, table.id, SessionStatus::Free);
    table_session::insert(pool, &session).await?;

    tracing::info!(
        table_id = table.id,
        label = %table.label,
        seats = table.seat_count,
        "Table created"
    );
    Ok(TableWithSession {
        table,
        session: Some(session),
    })
}

/// Floor view: every active table with its current session
pub async fn list_tables(pool: &SqlitePool, venue_id: i64) -> AppResult<Vec<TableWithSession>> {
    let tables = dining_table::find_all(pool, venue_id).await?;
    let mut out = Vec::with_capacity(tables.len());
    for table in tables {
        let session = table_session::find_open_by_table(pool, venue_id, table.id).await?;
        out.push(TableWithSession { table, session });
    }
    Ok(out)
}

/// Seat a party: close the FREE session and open an ORDERING one.
///
/// Fails `TableNotFound` if the table is not in this venue and
/// `TableOccupied` if the current session is anything but FREE.
pub async fn open_session(
    pool: &SqlitePool,
    op: &Operator,
    table_id: i64,
    req: OpenSessionRequest,
) -> AppResult<TableSession> {
    let table = dining_table::find_by_id(pool, op.venue_id, table_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::TableNotFound, format!("Table {table_id} not found"))
        })?;
    if table.is_merge_secondary() {
        return Err(AppError::new(ErrorCode::TableMerged));
    }

    let current = table_session::find_open_by_table(pool, op.venue_id, table_id).await?;
    if let Some(ref s) = current
        && s.status != SessionStatus::Free
    {
        return Err(AppError::with_message(
            ErrorCode::TableOccupied,
            format!("Table {} is {:?}", table.label, s.status),
        ));
    }

    let now = now_millis();
    let mut session = new_session(op.venue_id, table_id, SessionStatus::Ordering);
    session.customer_name = req.customer_name;
    session.party_size = req.party_size;

    let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;
    if let Some(s) = current {
        table_session::close(&mut *tx, s.id, now).await?;
    }
    table_session::insert(&mut *tx, &session).await?;
    tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

    tracing::info!(
        table_id,
        session_id = session.id,
        operator = op.operator_id,
        "Table session opened"
    );
    Ok(session)
}

/// Release the session referencing an order after the order leaves the
/// active set.
///
/// Resolution is two-step: by `order_id` first, then by the order's table
/// among open sessions. Completion can race with other table-clearing paths
/// (merge/unmerge, forced reset), so this must be safe to call redundantly
/// and must not fail when the table is already free. Returns whether the
/// table was actually freed.
pub async fn close_session_for_order(
    pool: &SqlitePool,
    venue_id: i64,
    order_id: i64,
) -> AppResult<bool> {
    let session = match table_session::find_open_by_order(pool, venue_id, order_id).await? {
        Some(s) => s,
        None => {
            // Fallback: match by table among open sessions
            let Some(order) = order_repo::find_by_id(pool, venue_id, order_id).await? else {
                return Ok(false);
            };
            let Some(table_id) = order.table_id else {
                return Ok(false);
            };
            match table_session::find_open_by_table(pool, venue_id, table_id).await? {
                Some(s) => s,
                None => return Ok(false),
            }
        }
    };

    // Already cleared by a concurrent path
    if session.status == SessionStatus::Free && session.order_id.is_none() {
        return Ok(false);
    }

    // Never assume this order was the only reason the table was occupied
    let remaining =
        order_repo::find_active_for_table(pool, venue_id, session.table_id, order_id).await?;
    if let Some(next) = remaining.first() {
        table_session::reassign_order(pool, session.id, Some(next.id)).await?;
        tracing::debug!(
            table_id = session.table_id,
            next_order = next.id,
            "Table still has active orders, session re-pointed"
        );
        return Ok(false);
    }

    // Merged sessions keep their merge state; only the order link is cleared
    if session.status == SessionStatus::Merged {
        table_session::reassign_order(pool, session.id, None).await?;
        return Ok(false);
    }

    let now = now_millis();
    let free = new_session(venue_id, session.table_id, SessionStatus::Free);
    let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;
    table_session::close_as_free(&mut *tx, session.id, now).await?;
    table_session::insert(&mut *tx, &free).await?;
    tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

    tracing::info!(table_id = session.table_id, order_id, "Table released");
    Ok(true)
}

/// Free a table's session if it has no active orders (reservation sweep
/// secondary effect). Returns whether the session was freed.
pub(crate) async fn free_table_if_clear(
    pool: &SqlitePool,
    venue_id: i64,
    table_id: i64,
) -> AppResult<bool> {
    let Some(session) = table_session::find_open_by_table(pool, venue_id, table_id).await? else {
        return Ok(false);
    };
    if session.status == SessionStatus::Free || session.status == SessionStatus::Merged {
        return Ok(false);
    }
    let active = order_repo::find_active_for_table(pool, venue_id, table_id, 0).await?;
    if !active.is_empty() {
        return Ok(false);
    }

    let now = now_millis();
    let free = new_session(venue_id, table_id, SessionStatus::Free);
    let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;
    table_session::close_as_free(&mut *tx, session.id, now).await?;
    table_session::insert(&mut *tx, &free).await?;
    tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::testutil::{seed_table, setup, staff};
    use shared::models::OrderStatus;

    #[tokio::test]
    async fn test_create_table_opens_free_session() {
        let db = setup().await;
        let op = staff();
        let created = create_table(
            &db.pool,
            &op,
            DiningTableCreate {
                label: "12".into(),
                seat_count: Some(6),
            },
        )
        .await
        .unwrap();
        assert_eq!(created.table.seat_count, 6);
        assert_eq!(created.session.as_ref().unwrap().status, SessionStatus::Free);

        // Duplicate label in the same venue is rejected
        let err = create_table(
            &db.pool,
            &op,
            DiningTableCreate {
                label: "12".into(),
                seat_count: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, shared::ErrorCode::AlreadyExists);
    }

    #[tokio::test]
    async fn test_open_session_on_free_table() {
        let db = setup().await;
        let op = staff();
        let table = seed_table(&db.pool, op.venue_id, "T1").await;

        let session = open_session(
            &db.pool,
            &op,
            table.id,
            OpenSessionRequest {
                customer_name: Some("Walk-in".into()),
                party_size: Some(3),
            },
        )
        .await
        .unwrap();

        assert_eq!(session.status, SessionStatus::Ordering);
        assert_eq!(session.party_size, Some(3));

        // The previous FREE session is closed; this one is current
        let current = table_session::find_open_by_table(&db.pool, op.venue_id, table.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.id, session.id);
    }

    #[tokio::test]
    async fn test_open_session_unknown_table() {
        let db = setup().await;
        let op = staff();
        let err = open_session(&db.pool, &op, 999, OpenSessionRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }

    #[tokio::test]
    async fn test_open_session_on_occupied_table() {
        let db = setup().await;
        let op = staff();
        let table = seed_table(&db.pool, op.venue_id, "T1").await;
        open_session(&db.pool, &op, table.id, OpenSessionRequest::default())
            .await
            .unwrap();

        let err = open_session(&db.pool, &op, table.id, OpenSessionRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TableOccupied);
    }

    #[tokio::test]
    async fn test_close_session_for_order_frees_table() {
        let db = setup().await;
        let op = staff();
        let table = seed_table(&db.pool, op.venue_id, "T1").await;
        let order = crate::lifecycle::testutil::seed_dine_in_order(
            &db.pool,
            &op,
            table.id,
            OrderStatus::Serving,
        )
        .await;

        let freed = close_session_for_order(&db.pool, op.venue_id, order.id)
            .await
            .unwrap();
        assert!(freed);

        let current = table_session::find_open_by_table(&db.pool, op.venue_id, table.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.status, SessionStatus::Free);
        assert!(current.order_id.is_none());
    }

    #[tokio::test]
    async fn test_double_close_is_error_free() {
        let db = setup().await;
        let op = staff();
        let table = seed_table(&db.pool, op.venue_id, "T1").await;
        let order = crate::lifecycle::testutil::seed_dine_in_order(
            &db.pool,
            &op,
            table.id,
            OrderStatus::Completed,
        )
        .await;

        assert!(close_session_for_order(&db.pool, op.venue_id, order.id)
            .await
            .unwrap());
        // Second close: nothing to do, no error, table stays FREE
        assert!(!close_session_for_order(&db.pool, op.venue_id, order.id)
            .await
            .unwrap());

        let current = table_session::find_open_by_table(&db.pool, op.venue_id, table.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.status, SessionStatus::Free);
    }

    #[tokio::test]
    async fn test_table_stays_occupied_with_other_active_orders() {
        let db = setup().await;
        let op = staff();
        let table = seed_table(&db.pool, op.venue_id, "T1").await;
        let first = crate::lifecycle::testutil::seed_dine_in_order(
            &db.pool,
            &op,
            table.id,
            OrderStatus::Serving,
        )
        .await;
        let second = crate::lifecycle::testutil::seed_dine_in_order(
            &db.pool,
            &op,
            table.id,
            OrderStatus::InPrep,
        )
        .await;

        let freed = close_session_for_order(&db.pool, op.venue_id, first.id)
            .await
            .unwrap();
        assert!(!freed);

        let current = table_session::find_open_by_table(&db.pool, op.venue_id, table.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.status, SessionStatus::Occupied);
        assert_eq!(current.order_id, Some(second.id));
    }
}
