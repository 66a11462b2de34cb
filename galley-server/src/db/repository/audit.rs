//! Audit Log Repository
//!
//! Append-only; entries are never updated or deleted.

use super::RepoResult;
use shared::models::AuditEntry;
use sqlx::SqlitePool;

const COLUMNS: &str =
    "id, venue_id, action, entity, entity_id, operator_id, operator_name, detail, created_at";

pub async fn insert(pool: &SqlitePool, entry: &AuditEntry) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO audit_log (id, venue_id, action, entity, entity_id, operator_id, \
         operator_name, detail, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(entry.id)
    .bind(entry.venue_id)
    .bind(entry.action)
    .bind(entry.entity.as_str())
    .bind(entry.entity_id)
    .bind(entry.operator_id)
    .bind(entry.operator_name.as_str())
    .bind(&entry.detail)
    .bind(entry.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_recent(
    pool: &SqlitePool,
    venue_id: i64,
    limit: i64,
) -> RepoResult<Vec<AuditEntry>> {
    let entries = sqlx::query_as::<_, AuditEntry>(&format!(
        "SELECT {COLUMNS} FROM audit_log WHERE venue_id = ? ORDER BY created_at DESC LIMIT ?"
    ))
    .bind(venue_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}
