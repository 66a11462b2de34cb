//! Kitchen Ticket Aggregator
//!
//! Readiness is recomputed from a fresh full read of the order's tickets at
//! the moment of the last update, never from the delta and never from a
//! counter. Two stations bumping their tickets nearly simultaneously both
//! re-read the full set inside their own transaction, so whichever update
//! lands last sees every ticket bumped and drives the order READY.

use crate::auth::Operator;
use crate::db::repository::{kitchen_ticket, order as order_repo};
use shared::models::{BulkTicketResult, BulkTicketUpdate, KitchenTicket, OrderStatus, TicketStatus};
use shared::util::now_millis;
use shared::{AppError, AppResult, ErrorCode};
use sqlx::SqlitePool;

/// Update a batch of tickets transactionally.
///
/// A missing ticket rolls the whole batch back with `TicketNotFound`. When
/// the new status is `bumped` and an order id is supplied, the order's full
/// ticket set is re-read; only if every ticket is bumped is the order driven
/// IN_PREP -> READY. An order with zero tickets is vacuously ready: it is
/// never blocked on kitchen state.
pub async fn bulk_update_tickets(
    pool: &SqlitePool,
    op: &Operator,
    req: BulkTicketUpdate,
) -> AppResult<BulkTicketResult> {
    if req.ticket_ids.is_empty() {
        return Err(AppError::validation("ticket_ids must not be empty"));
    }

    let now = now_millis();
    let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

    for &id in &req.ticket_ids {
        let rows = kitchen_ticket::update_status(&mut *tx, op.venue_id, id, req.status, now).await?;
        if rows == 0 {
            return Err(AppError::with_message(
                ErrorCode::TicketNotFound,
                format!("Kitchen ticket {id} not found"),
            ));
        }
    }

    let mut order_ready = false;
    if req.status == TicketStatus::Bumped
        && let Some(order_id) = req.order_id
    {
        // Recompute from the full set, not from the delta
        let tickets = kitchen_ticket::find_by_order(&mut *tx, order_id).await?;
        let all_bumped = tickets.iter().all(|t| t.status == TicketStatus::Bumped);
        if all_bumped {
            let rows = order_repo::update_status(
                &mut *tx,
                op.venue_id,
                order_id,
                OrderStatus::InPrep,
                OrderStatus::Ready,
                now,
            )
            .await?;
            // rows = 0 means the order already moved on; leave it alone
            order_ready = rows > 0;
        }
    }

    let mut tickets = Vec::with_capacity(req.ticket_ids.len());
    for &id in &req.ticket_ids {
        if let Some(t) = kitchen_ticket::find_by_id(&mut *tx, op.venue_id, id).await? {
            tickets.push(t);
        }
    }

    tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

    tracing::info!(
        count = tickets.len(),
        status = ?req.status,
        order_ready,
        "Kitchen tickets updated"
    );
    Ok(BulkTicketResult {
        tickets,
        order_ready,
    })
}

/// Tickets for one order (kitchen display)
pub async fn list_for_order(
    pool: &SqlitePool,
    _venue_id: i64,
    order_id: i64,
) -> AppResult<Vec<KitchenTicket>> {
    Ok(kitchen_ticket::find_by_order(pool, order_id).await?)
}
