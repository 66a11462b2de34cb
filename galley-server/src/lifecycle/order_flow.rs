//! Order State Machine
//!
//! Forward chain: PLACED -> ACCEPTED -> IN_PREP -> READY -> SERVING ->
//! COMPLETED, with CANCELLED/REFUNDED reachable from any non-terminal
//! state. Payment is an independent axis; the two only meet in the
//! completion precondition (SERVING and PAID, unless forced by a manager).
//!
//! Every write is conditioned on the previously read state. The loser of a
//! race either no-ops (the winner reached the same target) or gets a
//! precondition error; nothing here retries silently.

use crate::auth::Operator;
use crate::db::repository::{audit, dining_table, kitchen_ticket, order as order_repo, system_state, table_session};
use crate::lifecycle::{money, table_flow};
use shared::models::{
    AuditAction, AuditEntry, CompleteOrderRequest, KitchenTicket, Order, OrderCreate, OrderDetail,
    OrderItem, OrderStatus, OrderStatusUpdate, PaymentMethod, PaymentMode, PaymentStatus, Role,
    SessionStatus, TicketStatus,
};
use shared::util::{now_millis, snowflake_id};
use shared::{AppError, AppResult, ErrorCode};
use sqlx::SqlitePool;

/// Load an order or fail with `OrderNotFound`
pub(crate) async fn fetch_required(
    pool: &SqlitePool,
    venue_id: i64,
    order_id: i64,
) -> AppResult<Order> {
    order_repo::find_by_id(pool, venue_id, order_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::OrderNotFound, format!("Order {order_id} not found"))
        })
}

fn transition_error(from: OrderStatus, to: OrderStatus) -> AppError {
    match from {
        OrderStatus::Completed => AppError::new(ErrorCode::OrderAlreadyCompleted),
        OrderStatus::Cancelled => AppError::new(ErrorCode::OrderAlreadyCancelled),
        _ => AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            format!("Cannot transition from {} to {}", from.as_str(), to.as_str()),
        ),
    }
}

/// Place a new order (status PLACED) and attach it to its table session.
///
/// pay_at_till orders start with payment status TILL, everything else
/// UNPAID. The receipt number is the venue's daily sequence.
pub async fn place_order(
    pool: &SqlitePool,
    op: &Operator,
    data: OrderCreate,
) -> AppResult<OrderDetail> {
    money::validate_items(&data.items)?;
    if data.table_id.is_none() && data.counter_label.is_none() {
        return Err(AppError::validation(
            "either table_id or counter_label is required",
        ));
    }

    let mut table_label = None;
    if let Some(table_id) = data.table_id {
        let table = dining_table::find_by_id(pool, op.venue_id, table_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::TableNotFound,
                    format!("Table {table_id} not found"),
                )
            })?;
        if table.is_merge_secondary() {
            return Err(AppError::with_message(
                ErrorCode::TableMerged,
                format!("Table {} is merged into another table", table.label),
            ));
        }
        table_label = Some(table.label);
    }

    let now = now_millis();
    let date_key = chrono::Utc::now().format("%Y%m%d");
    let seq =
        system_state::next_sequence(pool, op.venue_id, &format!("receipt_seq:{date_key}"), now)
            .await?;

    let payment_status = match data.payment_mode {
        PaymentMode::PayAtTill => PaymentStatus::Till,
        PaymentMode::Online | PaymentMode::PayLater => PaymentStatus::Unpaid,
    };

    let order = Order {
        id: snowflake_id(),
        venue_id: op.venue_id,
        receipt_number: format!("R-{seq:04}"),
        status: OrderStatus::Placed,
        payment_status,
        payment_mode: data.payment_mode,
        payment_method: None,
        table_id: data.table_id,
        table_label,
        counter_label: data.counter_label,
        guest_count: data.guest_count.unwrap_or(1),
        total_amount: money::order_total(&data.items),
        forced: false,
        force_reason: None,
        paid_by: None,
        completed_by: None,
        created_at: now,
        updated_at: now,
        paid_at: None,
        completed_at: None,
    };

    let items: Vec<OrderItem> = data
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| OrderItem {
            id: snowflake_id(),
            order_id: order.id,
            position: i as i32,
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: money::line_total(item.unit_price, item.quantity),
            note: item.note.clone(),
        })
        .collect();

    let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;
    order_repo::insert(&mut *tx, &order).await?;
    for item in &items {
        order_repo::insert_item(&mut *tx, item).await?;
    }

    if let Some(table_id) = data.table_id {
        match table_session::find_open_by_table(&mut *tx, op.venue_id, table_id).await? {
            None => {
                // Table exists without a session yet (fresh layout)
                let mut session =
                    table_flow::new_session(op.venue_id, table_id, SessionStatus::Occupied);
                session.order_id = Some(order.id);
                table_session::insert(&mut *tx, &session).await?;
            }
            Some(s) => match s.status {
                SessionStatus::Free | SessionStatus::Ordering => {
                    table_session::attach_order(&mut *tx, s.id, order.id, SessionStatus::Occupied)
                        .await?;
                }
                SessionStatus::Occupied => {
                    // Another order already holds the session; leave it
                    if s.order_id.is_none() {
                        table_session::attach_order(
                            &mut *tx,
                            s.id,
                            order.id,
                            SessionStatus::Occupied,
                        )
                        .await?;
                    }
                }
                SessionStatus::Merged => {
                    // Merged primary table: keep the merge state, link the order
                    if s.order_id.is_none() {
                        table_session::reassign_order(&mut *tx, s.id, Some(order.id)).await?;
                    }
                }
            },
        }
    }

    tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

    tracing::info!(
        order_id = order.id,
        receipt = %order.receipt_number,
        table_id = ?order.table_id,
        total = order.total_amount,
        "Order placed"
    );
    Ok(OrderDetail { order, items })
}

/// Guarded status transition for everything except completion.
///
/// Entering IN_PREP spawns the kitchen tickets (one per requested station,
/// default a single unnamed ticket). REFUNDED also flips a PAID payment
/// status to REFUNDED. CANCELLED/REFUNDED release the table session the
/// same way completion does.
pub async fn update_status(
    pool: &SqlitePool,
    op: &Operator,
    order_id: i64,
    data: OrderStatusUpdate,
) -> AppResult<Order> {
    let order = fetch_required(pool, op.venue_id, order_id).await?;
    let target = data.status;

    if target == OrderStatus::Completed {
        return Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            "Completion goes through the completion operation",
        ));
    }
    if !OrderStatus::can_transition(order.status, target) {
        return Err(transition_error(order.status, target));
    }

    let now = now_millis();
    let rows = match target {
        OrderStatus::InPrep => {
            let stations: Vec<Option<String>> = match data.stations {
                Some(list) if !list.is_empty() => list.into_iter().map(Some).collect(),
                _ => vec![None],
            };
            let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;
            let rows =
                order_repo::update_status(&mut *tx, op.venue_id, order_id, order.status, target, now)
                    .await?;
            if rows > 0 {
                for station in stations {
                    let ticket = KitchenTicket {
                        id: snowflake_id(),
                        venue_id: op.venue_id,
                        order_id,
                        station,
                        status: TicketStatus::Preparing,
                        created_at: now,
                        updated_at: now,
                    };
                    kitchen_ticket::insert(&mut *tx, &ticket).await?;
                }
            }
            tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;
            rows
        }
        OrderStatus::Refunded => {
            let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;
            let rows =
                order_repo::update_status(&mut *tx, op.venue_id, order_id, order.status, target, now)
                    .await?;
            if rows > 0 && order.payment_status == PaymentStatus::Paid {
                order_repo::refund_payment(&mut *tx, op.venue_id, order_id, now).await?;
            }
            tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;
            rows
        }
        _ => order_repo::update_status(pool, op.venue_id, order_id, order.status, target, now)
            .await?,
    };

    if rows == 0 {
        // Lost a race; re-read and decide
        let fresh = fetch_required(pool, op.venue_id, order_id).await?;
        if fresh.status == target {
            return Ok(fresh);
        }
        return Err(transition_error(fresh.status, target));
    }

    if matches!(target, OrderStatus::Cancelled | OrderStatus::Refunded) {
        release_table(pool, op.venue_id, order_id).await;
    }

    tracing::info!(
        order_id,
        from = order.status.as_str(),
        to = target.as_str(),
        operator = op.operator_id,
        "Order status updated"
    );
    fetch_required(pool, op.venue_id, order_id).await
}

/// Collect payment. Idempotent: a second call on a PAID order returns the
/// existing record without touching paid_at/method (retries must not
/// double-apply side effects).
pub async fn mark_paid(
    pool: &SqlitePool,
    op: &Operator,
    order_id: i64,
    method_str: &str,
) -> AppResult<Order> {
    let method = PaymentMethod::parse(method_str).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::InvalidPaymentMethod,
            format!("Unknown payment method: {method_str}"),
        )
    })?;

    let order = fetch_required(pool, op.venue_id, order_id).await?;
    let from = match order.payment_status {
        PaymentStatus::Paid => return Ok(order),
        PaymentStatus::Refunded => return Err(AppError::new(ErrorCode::PaymentRefunded)),
        from @ (PaymentStatus::Unpaid | PaymentStatus::Till) => from,
    };

    let now = now_millis();
    let rows = order_repo::mark_paid(
        pool,
        op.venue_id,
        order_id,
        from,
        method,
        op.operator_id,
        now,
    )
    .await?;

    if rows == 0 {
        let fresh = fetch_required(pool, op.venue_id, order_id).await?;
        return match fresh.payment_status {
            PaymentStatus::Paid => Ok(fresh),
            PaymentStatus::Refunded => Err(AppError::new(ErrorCode::PaymentRefunded)),
            _ => Err(AppError::invalid("payment state changed concurrently")),
        };
    }

    tracing::info!(
        order_id,
        method = method.as_str(),
        operator = op.operator_id,
        "Payment collected"
    );
    fetch_required(pool, op.venue_id, order_id).await
}

/// Complete an order.
///
/// Normal completion requires SERVING status and PAID payment. `forced`
/// bypasses both, requires manager role and a reason, and is written to the
/// audit log. Idempotent: an already COMPLETED order is returned unchanged
/// with no side effects re-applied.
pub async fn complete_order(
    pool: &SqlitePool,
    op: &Operator,
    order_id: i64,
    req: CompleteOrderRequest,
) -> AppResult<Order> {
    let order = fetch_required(pool, op.venue_id, order_id).await?;

    match order.status {
        OrderStatus::Completed => return Ok(order),
        OrderStatus::Cancelled => return Err(AppError::new(ErrorCode::OrderAlreadyCancelled)),
        OrderStatus::Refunded | OrderStatus::Expired => {
            return Err(transition_error(order.status, OrderStatus::Completed));
        }
        _ => {}
    }

    if req.forced {
        op.require_role(Role::Manager)?;
        if req
            .force_reason
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .is_empty()
        {
            return Err(AppError::validation(
                "force_reason is required for forced completion",
            ));
        }
    } else {
        if order.status != OrderStatus::Serving {
            return Err(AppError::with_message(
                ErrorCode::OrderNotServing,
                format!(
                    "Order must be SERVING before completion (currently {})",
                    order.status.as_str()
                ),
            ));
        }
        if order.payment_status != PaymentStatus::Paid {
            return Err(AppError::new(ErrorCode::PaymentRequired));
        }
    }

    let now = now_millis();
    let rows = order_repo::complete(
        pool,
        op.venue_id,
        order_id,
        order.status,
        op.operator_id,
        req.forced,
        req.force_reason.as_deref(),
        now,
    )
    .await?;

    if rows == 0 {
        let fresh = fetch_required(pool, op.venue_id, order_id).await?;
        if fresh.status == OrderStatus::Completed {
            return Ok(fresh);
        }
        return Err(transition_error(fresh.status, OrderStatus::Completed));
    }

    // Secondary effects after the commit; none may fail the completion
    release_table(pool, op.venue_id, order_id).await;
    if req.forced {
        audit_forced_completion(pool, op, order_id, req.force_reason.as_deref()).await;
    }

    tracing::info!(
        order_id,
        forced = req.forced,
        operator = op.operator_id,
        "Order completed"
    );
    fetch_required(pool, op.venue_id, order_id).await
}

/// Order detail for the API
pub async fn get_order(pool: &SqlitePool, venue_id: i64, order_id: i64) -> AppResult<OrderDetail> {
    let order = fetch_required(pool, venue_id, order_id).await?;
    let items = order_repo::find_items(pool, order_id).await?;
    Ok(OrderDetail { order, items })
}

/// Active orders for the venue
pub async fn list_active(pool: &SqlitePool, venue_id: i64) -> AppResult<Vec<Order>> {
    Ok(order_repo::find_active(pool, venue_id).await?)
}

/// Best-effort table release after a terminal order transition
async fn release_table(pool: &SqlitePool, venue_id: i64, order_id: i64) {
    if let Err(e) = table_flow::close_session_for_order(pool, venue_id, order_id).await {
        tracing::warn!(order_id, error = %e, "Table release after order transition failed");
    }
}

/// Best-effort audit entry for a forced completion
async fn audit_forced_completion(
    pool: &SqlitePool,
    op: &Operator,
    order_id: i64,
    reason: Option<&str>,
) {
    let entry = AuditEntry {
        id: snowflake_id(),
        venue_id: op.venue_id,
        action: AuditAction::OrderForceCompleted,
        entity: "order".to_string(),
        entity_id: order_id,
        operator_id: op.operator_id,
        operator_name: op.operator_name.clone(),
        detail: reason
            .map(|r| serde_json::json!({ "reason": r }).to_string()),
        created_at: now_millis(),
    };
    if let Err(e) = audit::insert(pool, &entry).await {
        tracing::warn!(order_id, error = %e, "Audit write for forced completion failed");
    }
}
