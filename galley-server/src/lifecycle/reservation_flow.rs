//! Reservation Lifecycle Manager
//!
//! BOOKED -> CHECKED_IN -> COMPLETED, with CANCELLED from either active
//! state. The auto-complete sweep closes reservations on two independent
//! triggers (time elapsed, table settled) and records the reason for each.

use crate::auth::Operator;
use crate::db::repository::{dining_table, order as order_repo, reservation, table_session};
use crate::lifecycle::table_flow;
use shared::models::{
    AutoCompleteSummary, CompletionReason, OpenSessionRequest, Reservation, ReservationCreate,
    ReservationStatus, SessionStatus, TableSession,
};
use shared::util::{now_millis, snowflake_id};
use shared::{AppError, AppResult, ErrorCode};
use sqlx::SqlitePool;

async fn fetch_required(
    pool: &SqlitePool,
    venue_id: i64,
    id: i64,
) -> AppResult<Reservation> {
    reservation::find_by_id(pool, venue_id, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::ReservationNotFound,
                format!("Reservation {id} not found"),
            )
        })
}

/// Book a reservation (status BOOKED)
pub async fn book_reservation(
    pool: &SqlitePool,
    op: &Operator,
    data: ReservationCreate,
) -> AppResult<Reservation> {
    if data.end_at <= data.start_at {
        return Err(AppError::validation("end_at must be after start_at"));
    }
    if let Some(table_id) = data.table_id
        && dining_table::find_by_id(pool, op.venue_id, table_id)
            .await?
            .is_none()
    {
        return Err(AppError::with_message(
            ErrorCode::TableNotFound,
            format!("Table {table_id} not found"),
        ));
    }

    let now = now_millis();
    let booking = Reservation {
        id: snowflake_id(),
        venue_id: op.venue_id,
        table_id: data.table_id,
        status: ReservationStatus::Booked,
        customer_name: data.customer_name,
        party_size: data.party_size,
        start_at: data.start_at,
        end_at: data.end_at,
        completed_reason: None,
        created_at: now,
        updated_at: now,
    };
    reservation::insert(pool, &booking).await?;

    tracing::info!(
        reservation_id = booking.id,
        party_size = booking.party_size,
        "Reservation booked"
    );
    Ok(booking)
}

/// Seat a booked party: BOOKED -> CHECKED_IN, assign the table, occupy its
/// session.
pub async fn check_in_reservation(
    pool: &SqlitePool,
    op: &Operator,
    reservation_id: i64,
    table_id: i64,
) -> AppResult<Reservation> {
    let booking = fetch_required(pool, op.venue_id, reservation_id).await?;
    if booking.status != ReservationStatus::Booked {
        return Err(AppError::with_message(
            ErrorCode::ReservationNotActive,
            format!("Reservation is {:?}", booking.status),
        ));
    }

    // Occupy the table first so a taken table rejects the check-in cleanly
    let session = table_flow::open_session(
        pool,
        op,
        table_id,
        OpenSessionRequest {
            customer_name: Some(booking.customer_name.clone()),
            party_size: Some(booking.party_size),
        },
    )
    .await?;
    table_session::update_status(pool, session.id, SessionStatus::Occupied).await?;

    let now = now_millis();
    let rows = reservation::check_in(pool, op.venue_id, reservation_id, table_id, now).await?;
    if rows == 0 {
        // Lost a race after seating; report the fresh state
        let fresh = fetch_required(pool, op.venue_id, reservation_id).await?;
        return Err(AppError::with_message(
            ErrorCode::ReservationNotActive,
            format!("Reservation is {:?}", fresh.status),
        ));
    }

    tracing::info!(reservation_id, table_id, "Reservation checked in");
    fetch_required(pool, op.venue_id, reservation_id).await
}

/// Cancel an active reservation
pub async fn cancel_reservation(
    pool: &SqlitePool,
    op: &Operator,
    reservation_id: i64,
) -> AppResult<Reservation> {
    let booking = fetch_required(pool, op.venue_id, reservation_id).await?;
    if !ReservationStatus::can_transition(booking.status, ReservationStatus::Cancelled) {
        return Err(AppError::with_message(
            ErrorCode::ReservationNotActive,
            format!("Reservation is {:?}", booking.status),
        ));
    }

    let now = now_millis();
    let rows = reservation::update_status(
        pool,
        op.venue_id,
        reservation_id,
        booking.status,
        ReservationStatus::Cancelled,
        now,
    )
    .await?;
    if rows == 0 {
        let fresh = fetch_required(pool, op.venue_id, reservation_id).await?;
        return Err(AppError::with_message(
            ErrorCode::ReservationNotActive,
            format!("Reservation is {:?}", fresh.status),
        ));
    }

    tracing::info!(reservation_id, "Reservation cancelled");
    fetch_required(pool, op.venue_id, reservation_id).await
}

/// Auto-complete sweep over every active reservation.
///
/// Two independent triggers, evaluated per reservation:
/// (a) time-based: end_at has passed;
/// (b) payment-based: CHECKED_IN with a table that has zero active orders
///     and at least one historically PAID order.
/// Either trigger completes the reservation; the reason is persisted for
/// audit. Freeing the table afterwards is best-effort and never fails the
/// sweep.
pub async fn auto_complete_reservations(
    pool: &SqlitePool,
    op: &Operator,
) -> AppResult<AutoCompleteSummary> {
    let now = now_millis();
    let mut summary = AutoCompleteSummary::default();

    for booking in reservation::find_active(pool, op.venue_id).await? {
        let reason = if booking.end_at < now {
            Some(CompletionReason::TimeExpired)
        } else {
            payment_trigger(pool, op.venue_id, &booking).await?
        };

        let Some(reason) = reason else { continue };
        let rows =
            reservation::complete_with_reason(pool, op.venue_id, booking.id, reason, now).await?;
        if rows == 0 {
            continue; // raced with a manual transition
        }

        summary.completed += 1;
        match reason {
            CompletionReason::TimeExpired => summary.time_expired += 1,
            CompletionReason::PaymentCompleted => summary.payment_completed += 1,
        }

        // Best-effort: release the table if nothing is active on it
        if let Some(table_id) = booking.table_id {
            if let Err(e) = table_flow::free_table_if_clear(pool, op.venue_id, table_id).await {
                tracing::warn!(
                    reservation_id = booking.id,
                    table_id,
                    error = %e,
                    "Table release after reservation completion failed"
                );
            }
        }
    }

    tracing::info!(
        completed = summary.completed,
        time_expired = summary.time_expired,
        payment_completed = summary.payment_completed,
        "Reservation auto-complete sweep finished"
    );
    Ok(summary)
}

/// Payment-based completion trigger: checked in, table clear of active
/// orders, at least one PAID order on the table.
async fn payment_trigger(
    pool: &SqlitePool,
    venue_id: i64,
    booking: &Reservation,
) -> AppResult<Option<CompletionReason>> {
    if booking.status != ReservationStatus::CheckedIn {
        return Ok(None);
    }
    let Some(table_id) = booking.table_id else {
        return Ok(None);
    };
    let active = order_repo::find_active_for_table(pool, venue_id, table_id, 0).await?;
    if !active.is_empty() {
        return Ok(None);
    }
    if !order_repo::has_paid_order_for_table(pool, venue_id, table_id).await? {
        return Ok(None);
    }
    Ok(Some(CompletionReason::PaymentCompleted))
}

/// Current open session helper used by the reservations API
pub async fn current_session(
    pool: &SqlitePool,
    venue_id: i64,
    table_id: i64,
) -> AppResult<Option<TableSession>> {
    Ok(table_session::find_open_by_table(pool, venue_id, table_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::testutil::{place_test_order, seed_table, setup, staff};
    use shared::models::{CompleteOrderRequest, OrderStatus, OrderStatusUpdate};

    fn booking_data(start_at: i64, end_at: i64, table_id: Option<i64>) -> ReservationCreate {
        ReservationCreate {
            customer_name: "Ng".into(),
            party_size: 4,
            start_at,
            end_at,
            table_id,
        }
    }

    #[tokio::test]
    async fn test_book_and_check_in() {
        let db = setup().await;
        let op = staff();
        let table = seed_table(&db.pool, op.venue_id, "T1").await;
        let now = now_millis();

        let booking = book_reservation(&db.pool, &op, booking_data(now, now + 3_600_000, None))
            .await
            .unwrap();
        assert_eq!(booking.status, ReservationStatus::Booked);

        let seated = check_in_reservation(&db.pool, &op, booking.id, table.id)
            .await
            .unwrap();
        assert_eq!(seated.status, ReservationStatus::CheckedIn);
        assert_eq!(seated.table_id, Some(table.id));

        let session = table_session::find_open_by_table(&db.pool, op.venue_id, table.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.status, SessionStatus::Occupied);
        assert_eq!(session.customer_name.as_deref(), Some("Ng"));
    }

    #[tokio::test]
    async fn test_book_rejects_inverted_window() {
        let db = setup().await;
        let op = staff();
        let now = now_millis();
        let err = book_reservation(&db.pool, &op, booking_data(now, now - 1, None))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_cancel_completed_reservation_fails() {
        let db = setup().await;
        let op = staff();
        let now = now_millis();
        let booking = book_reservation(&db.pool, &op, booking_data(now - 10_000, now - 1, None))
            .await
            .unwrap();
        // Sweep completes it (time trigger)
        auto_complete_reservations(&db.pool, &op).await.unwrap();

        let err = cancel_reservation(&db.pool, &op, booking.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ReservationNotActive);
    }

    #[tokio::test]
    async fn test_time_expired_trigger() {
        let db = setup().await;
        let op = staff();
        let now = now_millis();
        let booking = book_reservation(&db.pool, &op, booking_data(now - 7_200_000, now - 3_600_000, None))
            .await
            .unwrap();

        let summary = auto_complete_reservations(&db.pool, &op).await.unwrap();
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.time_expired, 1);
        assert_eq!(summary.payment_completed, 0);

        let fresh = reservation::find_by_id(&db.pool, op.venue_id, booking.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fresh.status, ReservationStatus::Completed);
        assert_eq!(fresh.completed_reason, Some(CompletionReason::TimeExpired));
    }

    #[tokio::test]
    async fn test_payment_completed_trigger_frees_table() {
        let db = setup().await;
        let op = staff();
        let table = seed_table(&db.pool, op.venue_id, "T1").await;
        let now = now_millis();

        let booking = book_reservation(&db.pool, &op, booking_data(now, now + 3_600_000, None))
            .await
            .unwrap();
        check_in_reservation(&db.pool, &op, booking.id, table.id)
            .await
            .unwrap();

        // Party orders, pays, order completes
        let order = place_test_order(&db.pool, &op, Some(table.id)).await.order;
        for status in [
            OrderStatus::Accepted,
            OrderStatus::InPrep,
            OrderStatus::Ready,
            OrderStatus::Serving,
        ] {
            crate::lifecycle::order_flow::update_status(
                &db.pool,
                &op,
                order.id,
                OrderStatusUpdate { status, stations: None },
            )
            .await
            .unwrap();
        }
        crate::lifecycle::order_flow::mark_paid(&db.pool, &op, order.id, "card")
            .await
            .unwrap();
        crate::lifecycle::order_flow::complete_order(
            &db.pool,
            &op,
            order.id,
            CompleteOrderRequest::default(),
        )
        .await
        .unwrap();

        let summary = auto_complete_reservations(&db.pool, &op).await.unwrap();
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.payment_completed, 1);
        assert_eq!(summary.time_expired, 0);

        let fresh = reservation::find_by_id(&db.pool, op.venue_id, booking.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            fresh.completed_reason,
            Some(CompletionReason::PaymentCompleted)
        );

        let session = table_session::find_open_by_table(&db.pool, op.venue_id, table.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.status, SessionStatus::Free);
    }

    #[tokio::test]
    async fn test_checked_in_with_active_order_not_completed() {
        let db = setup().await;
        let op = staff();
        let table = seed_table(&db.pool, op.venue_id, "T1").await;
        let now = now_millis();

        let booking = book_reservation(&db.pool, &op, booking_data(now, now + 3_600_000, None))
            .await
            .unwrap();
        check_in_reservation(&db.pool, &op, booking.id, table.id)
            .await
            .unwrap();
        // Active, unpaid order on the table
        place_test_order(&db.pool, &op, Some(table.id)).await;

        let summary = auto_complete_reservations(&db.pool, &op).await.unwrap();
        assert_eq!(summary.completed, 0);

        let fresh = reservation::find_by_id(&db.pool, op.venue_id, booking.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fresh.status, ReservationStatus::CheckedIn);
    }
}
