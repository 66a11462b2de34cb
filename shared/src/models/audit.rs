//! 审计日志类型定义
//!
//! Append-only log of privileged operations. Entries are written after the
//! primary transition commits and never block it.

use serde::{Deserialize, Serialize};

/// Audited operation types (enum, not free text)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Order completed with the SERVING/PAID precondition bypassed
    OrderForceCompleted,
    /// End-of-day bulk reset executed
    DailyReset,
}

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AuditEntry {
    pub id: i64,
    pub venue_id: i64,
    pub action: AuditAction,
    /// Entity kind the action applied to ("order", "venue")
    pub entity: String,
    pub entity_id: i64,
    pub operator_id: i64,
    pub operator_name: String,
    /// JSON detail payload (reason, counts)
    pub detail: Option<String>,
    pub created_at: i64,
}
