//! Core: configuration, server state, HTTP server

pub mod config;
pub mod events;
pub mod server;
pub mod state;

pub use config::Config;
pub use events::{ChangeBroadcaster, ChangeEvent, ResourceVersions};
pub use server::Server;
pub use state::ServerState;
