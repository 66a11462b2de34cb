//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::AppResult;
use shared::models::{
    CompleteOrderRequest, MarkPaidRequest, Order, OrderCreate, OrderDetail, OrderStatusUpdate,
};

use crate::api::validate;
use crate::auth::Operator;
use crate::core::ServerState;
use crate::lifecycle::order_flow;

const RESOURCE: &str = "order";

/// POST /api/orders - place an order
pub async fn place(
    State(state): State<ServerState>,
    op: Operator,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<OrderDetail>> {
    validate(&payload)?;
    let detail = order_flow::place_order(&state.db.pool, &op, payload).await?;

    state.broadcast_change(RESOURCE, "created", detail.order.id, Some(&detail));
    Ok(Json(detail))
}

/// GET /api/orders - active orders for the venue
pub async fn list_active(
    State(state): State<ServerState>,
    op: Operator,
) -> AppResult<Json<Vec<Order>>> {
    let orders = order_flow::list_active(&state.db.pool, op.venue_id).await?;
    Ok(Json(orders))
}

/// GET /api/orders/:id - order with line items
pub async fn get_by_id(
    State(state): State<ServerState>,
    op: Operator,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let detail = order_flow::get_order(&state.db.pool, op.venue_id, id).await?;
    Ok(Json(detail))
}

/// POST /api/orders/:id/status - guarded status transition
pub async fn update_status(
    State(state): State<ServerState>,
    op: Operator,
    Path(id): Path<i64>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    let order = order_flow::update_status(&state.db.pool, &op, id, payload).await?;

    state.broadcast_change(RESOURCE, "updated", order.id, Some(&order));
    Ok(Json(order))
}

/// POST /api/orders/:id/payment - collect payment (idempotent)
pub async fn mark_paid(
    State(state): State<ServerState>,
    op: Operator,
    Path(id): Path<i64>,
    Json(payload): Json<MarkPaidRequest>,
) -> AppResult<Json<Order>> {
    let order = order_flow::mark_paid(&state.db.pool, &op, id, &payload.method).await?;

    state.broadcast_change(RESOURCE, "updated", order.id, Some(&order));
    Ok(Json(order))
}

/// POST /api/orders/:id/complete - complete the order (idempotent)
pub async fn complete(
    State(state): State<ServerState>,
    op: Operator,
    Path(id): Path<i64>,
    Json(payload): Json<CompleteOrderRequest>,
) -> AppResult<Json<Order>> {
    let order = order_flow::complete_order(&state.db.pool, &op, id, payload).await?;

    state.broadcast_change(RESOURCE, "updated", order.id, Some(&order));
    Ok(Json(order))
}
