//! Kitchen Ticket API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::AppResult;
use shared::models::{BulkTicketResult, BulkTicketUpdate, KitchenTicket};

use crate::auth::Operator;
use crate::core::ServerState;
use crate::lifecycle::kitchen;

const RESOURCE: &str = "kitchen_ticket";

#[derive(Debug, Deserialize)]
pub struct TicketQuery {
    pub order_id: i64,
}

/// GET /api/kitchen-tickets?order_id= - tickets for one order
pub async fn list_for_order(
    State(state): State<ServerState>,
    op: Operator,
    Query(query): Query<TicketQuery>,
) -> AppResult<Json<Vec<KitchenTicket>>> {
    let tickets = kitchen::list_for_order(&state.db.pool, op.venue_id, query.order_id).await?;
    Ok(Json(tickets))
}

/// POST /api/kitchen-tickets/bulk-update - transactional batch update
///
/// When the batch bumps the last ticket of an order, the result carries
/// `order_ready = true` and an order change is broadcast as well.
pub async fn bulk_update(
    State(state): State<ServerState>,
    op: Operator,
    Json(payload): Json<BulkTicketUpdate>,
) -> AppResult<Json<BulkTicketResult>> {
    let order_id = payload.order_id;
    let result = kitchen::bulk_update_tickets(&state.db.pool, &op, payload).await?;

    for ticket in &result.tickets {
        state.broadcast_change(RESOURCE, "updated", ticket.id, Some(ticket));
    }
    if result.order_ready
        && let Some(order_id) = order_id
    {
        state.broadcast_change::<()>("order", "updated", order_id, None);
    }
    Ok(Json(result))
}
