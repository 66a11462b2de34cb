//! Table Merge/Unmerge Engine
//!
//! Combines two FREE tables' capacity under one label for a large party and
//! reverses the combination. Both operations run in a single transaction so
//! a half-applied merge (label changed, session not) is never observable.
//! Merges are one level deep: a merge secondary can never take part in
//! another merge.

use crate::auth::Operator;
use crate::db::repository::{dining_table, order as order_repo, table_session};
use crate::lifecycle::table_flow;
use shared::models::{DiningTable, SessionStatus, TablePair};
use shared::util::now_millis;
use shared::{AppError, AppResult, ErrorCode};
use sqlx::SqlitePool;

async fn fetch_table(
    pool: &SqlitePool,
    venue_id: i64,
    table_id: i64,
) -> AppResult<DiningTable> {
    dining_table::find_by_id(pool, venue_id, table_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::TableNotFound, format!("Table {table_id} not found"))
        })
}

/// Merge two tables.
///
/// Preconditions: both tables exist in the venue and both current sessions
/// are FREE. On success the primary's label becomes `"A+B"` and its seat
/// count the sum; the secondary is marked as folded into the primary. The
/// primary's session transitions in place to MERGED; the secondary's is
/// closed and a fresh MERGED session opened so its "current session" lookup
/// reflects the merge.
pub async fn merge_tables(
    pool: &SqlitePool,
    op: &Operator,
    primary_id: i64,
    secondary_id: i64,
) -> AppResult<TablePair> {
    if primary_id == secondary_id {
        return Err(AppError::validation("cannot merge a table with itself"));
    }

    let primary = fetch_table(pool, op.venue_id, primary_id).await?;
    let secondary = fetch_table(pool, op.venue_id, secondary_id).await?;

    let not_free = || {
        AppError::with_message(ErrorCode::TableNotFree, "Both tables must be FREE to merge")
    };
    let primary_session = table_session::find_open_by_table(pool, op.venue_id, primary_id)
        .await?
        .ok_or_else(not_free)?;
    let secondary_session = table_session::find_open_by_table(pool, op.venue_id, secondary_id)
        .await?
        .ok_or_else(not_free)?;
    if primary_session.status != SessionStatus::Free
        || secondary_session.status != SessionStatus::Free
    {
        return Err(not_free());
    }

    let merged_label = format!("{}+{}", primary.label, secondary.label);
    let merged_seats = primary.seat_count + secondary.seat_count;
    let now = now_millis();

    let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;
    dining_table::apply_merge(&mut *tx, op.venue_id, primary_id, &merged_label, merged_seats)
        .await?;
    dining_table::set_merged_with(&mut *tx, op.venue_id, secondary_id, Some(primary_id)).await?;
    table_session::update_status(&mut *tx, primary_session.id, SessionStatus::Merged).await?;
    table_session::close(&mut *tx, secondary_session.id, now).await?;
    let merged_session = table_flow::new_session(op.venue_id, secondary_id, SessionStatus::Merged);
    table_session::insert(&mut *tx, &merged_session).await?;
    tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

    tracing::info!(
        primary = primary_id,
        secondary = secondary_id,
        label = %merged_label,
        seats = merged_seats,
        operator = op.operator_id,
        "Tables merged"
    );

    let primary = fetch_table(pool, op.venue_id, primary_id).await?;
    let secondary = fetch_table(pool, op.venue_id, secondary_id).await?;
    Ok(TablePair { primary, secondary })
}

/// Reverse a merge, restoring both tables' original labels and default seat
/// counts and opening fresh FREE sessions for both.
pub async fn unmerge_table(
    pool: &SqlitePool,
    op: &Operator,
    secondary_id: i64,
) -> AppResult<TablePair> {
    let secondary = fetch_table(pool, op.venue_id, secondary_id).await?;
    let Some(primary_id) = secondary.merged_with_table_id else {
        return Err(AppError::with_message(
            ErrorCode::TableNotMerged,
            format!("Table {} is not part of a merge", secondary.label),
        ));
    };
    let primary = fetch_table(pool, op.venue_id, primary_id).await?;

    // The combined table must be clear before it can be split again
    let active = order_repo::find_active_for_table(pool, op.venue_id, primary_id, 0).await?;
    if !active.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::TableOccupied,
            format!("Table {} still has active orders", primary.label),
        ));
    }

    // Restore the primary label by stripping the merge suffix
    let suffix = format!("+{}", secondary.label);
    let restored_label = primary
        .label
        .strip_suffix(suffix.as_str())
        .unwrap_or_else(|| primary.label.split('+').next().unwrap_or(&primary.label))
        .to_string();

    let now = now_millis();
    let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;
    dining_table::restore_defaults(&mut *tx, op.venue_id, primary_id, &restored_label).await?;
    dining_table::restore_defaults(&mut *tx, op.venue_id, secondary_id, &secondary.label).await?;
    if let Some(s) = table_session::find_open_by_table(&mut *tx, op.venue_id, primary_id).await? {
        table_session::close(&mut *tx, s.id, now).await?;
    }
    if let Some(s) = table_session::find_open_by_table(&mut *tx, op.venue_id, secondary_id).await? {
        table_session::close(&mut *tx, s.id, now).await?;
    }
    let free_primary = table_flow::new_session(op.venue_id, primary_id, SessionStatus::Free);
    let free_secondary = table_flow::new_session(op.venue_id, secondary_id, SessionStatus::Free);
    table_session::insert(&mut *tx, &free_primary).await?;
    table_session::insert(&mut *tx, &free_secondary).await?;
    tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

    tracing::info!(
        primary = primary_id,
        secondary = secondary_id,
        label = %restored_label,
        operator = op.operator_id,
        "Tables unmerged"
    );

    let primary = fetch_table(pool, op.venue_id, primary_id).await?;
    let secondary = fetch_table(pool, op.venue_id, secondary_id).await?;
    Ok(TablePair { primary, secondary })
}
