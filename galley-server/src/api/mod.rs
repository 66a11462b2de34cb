//! API routes
//!
//! # Structure
//!
//! - [`health`] - liveness and database ping
//! - [`orders`] - order placement, transitions, payment, completion
//! - [`kitchen_tickets`] - ticket batches for kitchen displays
//! - [`tables`] - floor view, sessions, merge/unmerge
//! - [`reservations`] - booking, check-in, the auto-complete sweep
//! - [`system`] - daily reset
//!
//! Handlers stay thin: extract the [`Operator`] context, validate the
//! payload, call the lifecycle coordinator, broadcast the committed change.
//!
//! [`Operator`]: crate::auth::Operator

use axum::Router;
use shared::{AppError, AppResult};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use validator::Validate;

use crate::core::ServerState;

pub mod health;
pub mod kitchen_tickets;
pub mod orders;
pub mod reservations;
pub mod system;
pub mod tables;

/// Validate a request payload at the boundary, before the coordinator runs
pub(crate) fn validate(payload: &impl Validate) -> AppResult<()> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))
}

/// All routes, no middleware, no state
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(kitchen_tickets::router())
        .merge(tables::router())
        .merge(reservations::router())
        .merge(system::router())
}

/// Fully configured application with middleware and state
pub fn build_app(state: ServerState) -> Router {
    build_router()
        // CORS - the coordinator sits behind the venue gateway
        .layer(CorsLayer::permissive())
        // Request tracing
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
