//! Reservation API

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reservations", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::book).get(handler::list_active))
        .route("/{id}/check-in", post(handler::check_in))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/auto-complete", post(handler::auto_complete))
}
