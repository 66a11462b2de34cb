//! Table Session Model (桌台会话)
//!
//! One open (closed_at IS NULL) session per table at any time. Sessions are
//! closed, never deleted; a fresh FREE session is opened immediately after
//! closing one so "current session" is always a single lookup.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Table session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Free,
    Occupied,
    Ordering,
    /// Secondary or primary member of a table merge
    Merged,
}

/// Table session entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TableSession {
    pub id: i64,
    pub venue_id: i64,
    pub table_id: i64,
    /// At most one open order reference
    pub order_id: Option<i64>,
    pub status: SessionStatus,
    pub customer_name: Option<String>,
    pub party_size: Option<i32>,
    pub opened_at: i64,
    pub closed_at: Option<i64>,
}

/// Open session payload (seat a party before ordering)
#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct OpenSessionRequest {
    #[validate(length(max = 120))]
    pub customer_name: Option<String>,
    #[validate(range(min = 1, max = 64))]
    pub party_size: Option<i32>,
}

/// Table plus its current open session (floor view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableWithSession {
    pub table: super::DiningTable,
    pub session: Option<TableSession>,
}
