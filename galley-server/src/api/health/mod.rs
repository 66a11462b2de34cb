//! Health API

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use shared::{AppError, AppResult};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(check))
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub environment: String,
}

/// GET /health - liveness plus a database round trip
pub async fn check(State(state): State<ServerState>) -> AppResult<Json<HealthStatus>> {
    sqlx::query("SELECT 1")
        .execute(&state.db.pool)
        .await
        .map_err(|e| AppError::database(format!("Health ping failed: {e}")))?;

    Ok(Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_pings_db() {
        let state = ServerState::in_memory().await.unwrap();
        let Json(body) = check(State(state)).await.unwrap();
        assert_eq!(body.status, "ok");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }
}
