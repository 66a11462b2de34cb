//! System / bulk operation payloads

use serde::{Deserialize, Serialize};

/// Daily reset request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyResetRequest {
    /// Additionally delete all order rows outright (irreversible)
    #[serde(default)]
    pub force: bool,
}

/// Per-step daily reset summary
///
/// Steps run independently; failures are collected in `errors` without
/// rolling back earlier steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyResetSummary {
    pub completed_orders: u64,
    pub cancelled_reservations: u64,
    pub deleted_sessions: u64,
    pub deleted_tables: u64,
    pub cleared_state_rows: u64,
    /// Only non-zero when force = true
    pub deleted_orders: u64,
    pub errors: Vec<String>,
}
