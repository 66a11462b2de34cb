//! Reservation API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::AppResult;
use shared::models::{AutoCompleteSummary, CheckInRequest, Reservation, ReservationCreate};

use crate::api::validate;
use crate::auth::Operator;
use crate::core::ServerState;
use crate::db::repository::reservation;
use crate::lifecycle::reservation_flow;

const RESOURCE: &str = "reservation";

/// POST /api/reservations - book a reservation
pub async fn book(
    State(state): State<ServerState>,
    op: Operator,
    Json(payload): Json<ReservationCreate>,
) -> AppResult<Json<Reservation>> {
    validate(&payload)?;
    let booking = reservation_flow::book_reservation(&state.db.pool, &op, payload).await?;

    state.broadcast_change(RESOURCE, "created", booking.id, Some(&booking));
    Ok(Json(booking))
}

/// GET /api/reservations - active (BOOKED/CHECKED_IN) reservations
pub async fn list_active(
    State(state): State<ServerState>,
    op: Operator,
) -> AppResult<Json<Vec<Reservation>>> {
    let bookings = reservation::find_active(&state.db.pool, op.venue_id).await?;
    Ok(Json(bookings))
}

/// POST /api/reservations/:id/check-in - seat the party
pub async fn check_in(
    State(state): State<ServerState>,
    op: Operator,
    Path(id): Path<i64>,
    Json(payload): Json<CheckInRequest>,
) -> AppResult<Json<Reservation>> {
    let booking =
        reservation_flow::check_in_reservation(&state.db.pool, &op, id, payload.table_id).await?;

    state.broadcast_change(RESOURCE, "updated", booking.id, Some(&booking));
    Ok(Json(booking))
}

/// POST /api/reservations/:id/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    op: Operator,
    Path(id): Path<i64>,
) -> AppResult<Json<Reservation>> {
    let booking = reservation_flow::cancel_reservation(&state.db.pool, &op, id).await?;

    state.broadcast_change(RESOURCE, "updated", booking.id, Some(&booking));
    Ok(Json(booking))
}

/// POST /api/reservations/auto-complete - run the sweep
pub async fn auto_complete(
    State(state): State<ServerState>,
    op: Operator,
) -> AppResult<Json<AutoCompleteSummary>> {
    let summary = reservation_flow::auto_complete_reservations(&state.db.pool, &op).await?;

    if summary.completed > 0 {
        state.broadcast_change::<()>(RESOURCE, "updated", op.venue_id, None);
    }
    Ok(Json(summary))
}
