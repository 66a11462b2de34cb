//! Data models
//!
//! Shared between galley-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY); all timestamps are
//! Unix millis (`i64`).

pub mod audit;
pub mod dining_table;
pub mod kitchen_ticket;
pub mod order;
pub mod reservation;
pub mod role;
pub mod system;
pub mod table_session;

// Re-exports
pub use audit::*;
pub use dining_table::*;
pub use kitchen_ticket::*;
pub use order::*;
pub use reservation::*;
pub use role::*;
pub use system::*;
pub use table_session::*;
