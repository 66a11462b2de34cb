//! Dining Table Model (桌台)

use serde::{Deserialize, Serialize};

/// Dining table entity
///
/// A table that has been merged into another carries
/// `merged_with_table_id` pointing at the primary table; merges are at most
/// one level deep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub venue_id: i64,
    pub label: String,
    pub seat_count: i32,
    /// Seat count restored on unmerge
    pub default_seat_count: i32,
    pub merged_with_table_id: Option<i64>,
    pub is_active: bool,
}

impl DiningTable {
    /// Whether this table is the secondary member of a merge
    pub fn is_merge_secondary(&self) -> bool {
        self.merged_with_table_id.is_some()
    }
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub label: String,
    pub seat_count: Option<i32>,
}

/// Merge request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMergeRequest {
    pub primary_table_id: i64,
    pub secondary_table_id: i64,
}

/// Result of a merge or unmerge: both affected tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablePair {
    pub primary: DiningTable,
    pub secondary: DiningTable,
}
