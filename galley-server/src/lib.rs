//! Galley Server - restaurant floor lifecycle coordinator
//!
//! # Overview
//!
//! The coordinator owns the order / table-session / kitchen-ticket state
//! machine for a venue: how an order moves through preparation and payment,
//! how a table's occupancy is derived from its orders, how kitchen tickets
//! aggregate back into order readiness, and how those transitions stay
//! correct when front-of-house, the kitchen display, and sweep jobs act on
//! the same rows concurrently.
//!
//! # Module structure
//!
//! ```text
//! galley-server/src/
//! ├── core/        # config, server state, change broadcast, HTTP server
//! ├── auth/        # operator context from gateway headers
//! ├── db/          # SQLite pool, migrations, repositories
//! ├── lifecycle/   # the state machine itself
//! ├── api/         # HTTP routes and handlers
//! └── utils/       # logging setup
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod lifecycle;
pub mod utils;

// Re-export public types
pub use auth::Operator;
pub use core::{Config, Server, ServerState};
pub use db::DbService;
pub use utils::{init_logger, init_logger_with_file};

/// Prepare the process environment: .env file, then logging
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ______      ____
  / ____/___ _/ / /__  __  __
 / / __/ __ `/ / / _ \/ / / /
/ /_/ / /_/ / / /  __/ /_/ /
\____/\__,_/_/_/\___/\__, /
                    /____/
    "#
    );
}
