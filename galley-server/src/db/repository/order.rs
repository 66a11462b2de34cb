//! Order Repository
//!
//! Status writes are always conditioned on the previously read state; a
//! rows_affected of 0 means the caller lost a race and must decide whether
//! that is a no-op or an error.

use super::RepoResult;
use shared::models::{Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus};
use sqlx::{Sqlite, SqlitePool};

const COLUMNS: &str = "id, venue_id, receipt_number, status, payment_status, payment_mode, payment_method, table_id, table_label, counter_label, guest_count, total_amount, forced, force_reason, paid_by, completed_by, created_at, updated_at, paid_at, completed_at";

/// Active statuses for table-occupancy checks; keep in sync with
/// [`OrderStatus::ACTIVE`]
const ACTIVE_SET: &str = "('PLACED', 'ACCEPTED', 'IN_PREP', 'READY', 'SERVING')";

pub async fn find_by_id(
    pool: &SqlitePool,
    venue_id: i64,
    id: i64,
) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE id = ? AND venue_id = ?"
    ))
    .bind(id)
    .bind(venue_id)
    .fetch_optional(pool)
    .await?;
    Ok(order)
}

pub async fn find_items(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, position, name, quantity, unit_price, line_total, note \
         FROM order_items WHERE order_id = ? ORDER BY position",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn find_active(pool: &SqlitePool, venue_id: i64) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE venue_id = ? AND status IN {ACTIVE_SET} ORDER BY created_at"
    ))
    .bind(venue_id)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

/// Active orders on a table, excluding one order (pass 0 to exclude none).
/// Used to re-check occupancy before freeing a table.
pub async fn find_active_for_table(
    pool: &SqlitePool,
    venue_id: i64,
    table_id: i64,
    exclude_order_id: i64,
) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders \
         WHERE venue_id = ? AND table_id = ? AND id <> ? AND status IN {ACTIVE_SET} \
         ORDER BY created_at"
    ))
    .bind(venue_id)
    .bind(table_id)
    .bind(exclude_order_id)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

/// Whether the table has ever had a PAID order (any order status)
pub async fn has_paid_order_for_table(
    pool: &SqlitePool,
    venue_id: i64,
    table_id: i64,
) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM orders WHERE venue_id = ? AND table_id = ? AND payment_status = 'PAID'",
    )
    .bind(venue_id)
    .bind(table_id)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

pub async fn insert<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    order: &Order,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO orders (id, venue_id, receipt_number, status, payment_status, payment_mode, \
         payment_method, table_id, table_label, counter_label, guest_count, total_amount, forced, \
         force_reason, paid_by, completed_by, created_at, updated_at, paid_at, completed_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(order.id)
    .bind(order.venue_id)
    .bind(&order.receipt_number)
    .bind(order.status)
    .bind(order.payment_status)
    .bind(order.payment_mode)
    .bind(order.payment_method)
    .bind(order.table_id)
    .bind(&order.table_label)
    .bind(&order.counter_label)
    .bind(order.guest_count)
    .bind(order.total_amount)
    .bind(order.forced)
    .bind(&order.force_reason)
    .bind(order.paid_by)
    .bind(order.completed_by)
    .bind(order.created_at)
    .bind(order.updated_at)
    .bind(order.paid_at)
    .bind(order.completed_at)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn insert_item<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    item: &OrderItem,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO order_items (id, order_id, position, name, quantity, unit_price, line_total, note) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(item.id)
    .bind(item.order_id)
    .bind(item.position)
    .bind(item.name.as_str())
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(item.line_total)
    .bind(&item.note)
    .execute(exec)
    .await?;
    Ok(())
}

/// Conditional status transition. Returns rows affected (0 = lost the race
/// or wrong current status).
pub async fn update_status<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    venue_id: i64,
    id: i64,
    from: OrderStatus,
    to: OrderStatus,
    now: i64,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND venue_id = ? AND status = ?",
    )
    .bind(to)
    .bind(now)
    .bind(id)
    .bind(venue_id)
    .bind(from)
    .execute(exec)
    .await?;
    Ok(rows.rows_affected())
}

/// Collect payment, conditioned on the previously read payment status
pub async fn mark_paid(
    pool: &SqlitePool,
    venue_id: i64,
    id: i64,
    from: PaymentStatus,
    method: PaymentMethod,
    operator_id: i64,
    now: i64,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE orders SET payment_status = 'PAID', payment_method = ?, paid_by = ?, paid_at = ?, \
         updated_at = ? WHERE id = ? AND venue_id = ? AND payment_status = ?",
    )
    .bind(method)
    .bind(operator_id)
    .bind(now)
    .bind(now)
    .bind(id)
    .bind(venue_id)
    .bind(from)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

/// Complete an order, conditioned on the previously read status
#[allow(clippy::too_many_arguments)]
pub async fn complete(
    pool: &SqlitePool,
    venue_id: i64,
    id: i64,
    from: OrderStatus,
    operator_id: i64,
    forced: bool,
    force_reason: Option<&str>,
    now: i64,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE orders SET status = 'COMPLETED', completed_by = ?, completed_at = ?, forced = ?, \
         force_reason = ?, updated_at = ? WHERE id = ? AND venue_id = ? AND status = ?",
    )
    .bind(operator_id)
    .bind(now)
    .bind(forced)
    .bind(force_reason)
    .bind(now)
    .bind(id)
    .bind(venue_id)
    .bind(from)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

/// Flip a PAID order's payment status to REFUNDED
pub async fn refund_payment<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    venue_id: i64,
    id: i64,
    now: i64,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE orders SET payment_status = 'REFUNDED', updated_at = ? \
         WHERE id = ? AND venue_id = ? AND payment_status = 'PAID'",
    )
    .bind(now)
    .bind(id)
    .bind(venue_id)
    .execute(exec)
    .await?;
    Ok(rows.rows_affected())
}

/// Daily reset step 1: force-complete every active order
pub async fn bulk_complete_active(
    pool: &SqlitePool,
    venue_id: i64,
    operator_id: i64,
    now: i64,
) -> RepoResult<u64> {
    let rows = sqlx::query(&format!(
        "UPDATE orders SET status = 'COMPLETED', completed_by = ?, completed_at = ?, forced = 1, \
         force_reason = 'daily_reset', updated_at = ? \
         WHERE venue_id = ? AND status IN {ACTIVE_SET}"
    ))
    .bind(operator_id)
    .bind(now)
    .bind(now)
    .bind(venue_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

/// Force reset: delete the venue's orders and their line items outright
pub async fn delete_all_for_venue(pool: &SqlitePool, venue_id: i64) -> RepoResult<u64> {
    sqlx::query("DELETE FROM order_items WHERE order_id IN (SELECT id FROM orders WHERE venue_id = ?)")
        .bind(venue_id)
        .execute(pool)
        .await?;
    let rows = sqlx::query("DELETE FROM orders WHERE venue_id = ?")
        .bind(venue_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}
