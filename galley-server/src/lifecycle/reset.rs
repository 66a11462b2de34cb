//! Daily/Bulk Reset Coordinator
//!
//! End-of-day sweep: force-complete active orders, cancel booked
//! reservations, drop the table layout and runtime state, optionally delete
//! order rows outright. Steps run independently; a failed step is reported
//! in the summary without rolling back earlier steps. The operation is
//! idempotent and intentionally irreversible.

use crate::auth::Operator;
use crate::db::repository::{
    audit, dining_table, kitchen_ticket, order as order_repo, reservation, system_state,
    table_session,
};
use shared::models::{AuditAction, AuditEntry, DailyResetSummary, Role};
use shared::util::{now_millis, snowflake_id};
use shared::AppResult;
use sqlx::SqlitePool;

/// Run the daily reset for a venue. Admin role required.
pub async fn daily_reset(
    pool: &SqlitePool,
    op: &Operator,
    force: bool,
) -> AppResult<DailyResetSummary> {
    op.require_role(Role::Admin)?;

    let now = now_millis();
    let mut summary = DailyResetSummary::default();

    // 1. Force-complete every active order
    match order_repo::bulk_complete_active(pool, op.venue_id, op.operator_id, now).await {
        Ok(n) => summary.completed_orders = n,
        Err(e) => summary.errors.push(format!("complete orders: {e}")),
    }

    // 2. Cancel every booked reservation
    match reservation::cancel_all_booked(pool, op.venue_id, now).await {
        Ok(n) => summary.cancelled_reservations = n,
        Err(e) => summary.errors.push(format!("cancel reservations: {e}")),
    }

    // 3. Drop the table layout (sessions first, then tables)
    match table_session::delete_all_for_venue(pool, op.venue_id).await {
        Ok(n) => summary.deleted_sessions = n,
        Err(e) => summary.errors.push(format!("delete sessions: {e}")),
    }
    match dining_table::delete_all_for_venue(pool, op.venue_id).await {
        Ok(n) => summary.deleted_tables = n,
        Err(e) => summary.errors.push(format!("delete tables: {e}")),
    }

    // 4. Clear derived runtime state
    match system_state::clear_for_venue(pool, op.venue_id).await {
        Ok(n) => summary.cleared_state_rows = n,
        Err(e) => summary.errors.push(format!("clear runtime state: {e}")),
    }

    // 5. Force: delete the order history outright
    if force {
        if let Err(e) = kitchen_ticket::delete_all_for_venue(pool, op.venue_id).await {
            summary.errors.push(format!("delete tickets: {e}"));
        }
        match order_repo::delete_all_for_venue(pool, op.venue_id).await {
            Ok(n) => summary.deleted_orders = n,
            Err(e) => summary.errors.push(format!("delete orders: {e}")),
        }
    }

    write_audit(pool, op, force, &summary).await;

    tracing::info!(
        venue_id = op.venue_id,
        force,
        completed_orders = summary.completed_orders,
        cancelled_reservations = summary.cancelled_reservations,
        errors = summary.errors.len(),
        "Daily reset finished"
    );
    Ok(summary)
}

/// Best-effort audit entry for the reset
async fn write_audit(pool: &SqlitePool, op: &Operator, force: bool, summary: &DailyResetSummary) {
    let detail = serde_json::json!({
        "force": force,
        "completed_orders": summary.completed_orders,
        "cancelled_reservations": summary.cancelled_reservations,
        "deleted_orders": summary.deleted_orders,
    });
    let entry = AuditEntry {
        id: snowflake_id(),
        venue_id: op.venue_id,
        action: AuditAction::DailyReset,
        entity: "venue".to_string(),
        entity_id: op.venue_id,
        operator_id: op.operator_id,
        operator_name: op.operator_name.clone(),
        detail: Some(detail.to_string()),
        created_at: now_millis(),
    };
    if let Err(e) = audit::insert(pool, &entry).await {
        tracing::warn!(venue_id = op.venue_id, error = %e, "Audit write for daily reset failed");
    }
}
