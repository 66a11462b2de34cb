//! System API

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/system", routes())
}

fn routes() -> Router<ServerState> {
    Router::new().route("/daily-reset", post(handler::daily_reset))
}
