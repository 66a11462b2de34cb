//! Dining Table Repository

use super::{RepoError, RepoResult};
use shared::models::{DiningTable, DiningTableCreate};
use shared::util::snowflake_id;
use sqlx::{Sqlite, SqlitePool};

const COLUMNS: &str =
    "id, venue_id, label, seat_count, default_seat_count, merged_with_table_id, is_active";

pub async fn find_by_id<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    venue_id: i64,
    id: i64,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_tables WHERE id = ? AND venue_id = ?"
    ))
    .bind(id)
    .bind(venue_id)
    .fetch_optional(exec)
    .await?;
    Ok(table)
}

pub async fn find_all(pool: &SqlitePool, venue_id: i64) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_tables WHERE venue_id = ? AND is_active = 1 ORDER BY label"
    ))
    .bind(venue_id)
    .fetch_all(pool)
    .await?;
    Ok(tables)
}

pub async fn find_by_label(
    pool: &SqlitePool,
    venue_id: i64,
    label: &str,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_tables WHERE venue_id = ? AND label = ? LIMIT 1"
    ))
    .bind(venue_id)
    .bind(label)
    .fetch_optional(pool)
    .await?;
    Ok(table)
}

pub async fn create(
    pool: &SqlitePool,
    venue_id: i64,
    data: DiningTableCreate,
) -> RepoResult<DiningTable> {
    // Check duplicate label in venue
    if find_by_label(pool, venue_id, &data.label).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Table '{}' already exists",
            data.label
        )));
    }

    let seats = data.seat_count.unwrap_or(4);
    let table = DiningTable {
        id: snowflake_id(),
        venue_id,
        label: data.label,
        seat_count: seats,
        default_seat_count: seats,
        merged_with_table_id: None,
        is_active: true,
    };

    sqlx::query(
        "INSERT INTO dining_tables (id, venue_id, label, seat_count, default_seat_count, \
         merged_with_table_id, is_active) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(table.id)
    .bind(table.venue_id)
    .bind(table.label.as_str())
    .bind(table.seat_count)
    .bind(table.default_seat_count)
    .bind(table.merged_with_table_id)
    .bind(table.is_active)
    .execute(pool)
    .await?;

    Ok(table)
}

/// Merge: expand the primary table's label and capacity
pub async fn apply_merge<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    venue_id: i64,
    id: i64,
    label: &str,
    seat_count: i32,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE dining_tables SET label = ?, seat_count = ? WHERE id = ? AND venue_id = ?",
    )
    .bind(label)
    .bind(seat_count)
    .bind(id)
    .bind(venue_id)
    .execute(exec)
    .await?;
    Ok(rows.rows_affected())
}

/// Merge: mark the secondary table as folded into the primary
pub async fn set_merged_with<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    venue_id: i64,
    id: i64,
    primary_id: Option<i64>,
) -> RepoResult<u64> {
    let rows =
        sqlx::query("UPDATE dining_tables SET merged_with_table_id = ? WHERE id = ? AND venue_id = ?")
            .bind(primary_id)
            .bind(id)
            .bind(venue_id)
            .execute(exec)
            .await?;
    Ok(rows.rows_affected())
}

/// Unmerge: restore a table's label and default capacity, clear merge ref
pub async fn restore_defaults<'e>(
    exec: impl sqlx::Executor<'e, Database = Sqlite>,
    venue_id: i64,
    id: i64,
    label: &str,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE dining_tables SET label = ?, seat_count = default_seat_count, \
         merged_with_table_id = NULL WHERE id = ? AND venue_id = ?",
    )
    .bind(label)
    .bind(id)
    .bind(venue_id)
    .execute(exec)
    .await?;
    Ok(rows.rows_affected())
}

/// Daily reset step 3: drop the venue's table layout
pub async fn delete_all_for_venue(pool: &SqlitePool, venue_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM dining_tables WHERE venue_id = ?")
        .bind(venue_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}
