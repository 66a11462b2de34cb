//! Kitchen Ticket Model (厨房工单)
//!
//! One order spawns 1..N tickets (one per prep station). Order readiness is
//! a pure function of the full ticket set: the order goes READY only when
//! every ticket is bumped, recomputed from a fresh read at each update.

use serde::{Deserialize, Serialize};

/// Kitchen ticket status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Preparing,
    Ready,
    Bumped,
    Served,
    Cancelled,
}

/// Kitchen ticket entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct KitchenTicket {
    pub id: i64,
    pub venue_id: i64,
    pub order_id: i64,
    /// Prep station label (grill, fryer, ...), None for single-station venues
    pub station: Option<String>,
    pub status: TicketStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Bulk ticket update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkTicketUpdate {
    pub ticket_ids: Vec<i64>,
    pub status: TicketStatus,
    /// When set and status = bumped, readiness of this order is recomputed
    pub order_id: Option<i64>,
}

/// Bulk ticket update result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkTicketResult {
    pub tickets: Vec<KitchenTicket>,
    /// Whether the update drove the order to READY
    pub order_ready: bool,
}
