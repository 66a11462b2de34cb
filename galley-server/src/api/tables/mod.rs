//! Table API

mod handler;

use axum::{Router, routing::{get, post}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}/session", post(handler::open_session))
        .route("/merge", post(handler::merge))
        .route("/{id}/unmerge", post(handler::unmerge))
}
