use std::sync::Arc;

use serde::Serialize;
use shared::AppResult;

use crate::core::events::ChangeBroadcaster;
use crate::core::Config;
use crate::db::DbService;

/// Shared server state handed to every handler
///
/// Cloning is shallow (Arc / pool handles); axum clones it per request.
///
/// | Field | Meaning |
/// |-------|---------|
/// | config | configuration (immutable) |
/// | db | SQLite pool + migrations |
/// | changes | best-effort change broadcast |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub changes: Arc<ChangeBroadcaster>,
}

impl ServerState {
    /// Open the database, run migrations, and wire up the broadcast channel
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        let db = DbService::new(&config.db_path).await?;
        Ok(Self {
            config: config.clone(),
            db,
            changes: Arc::new(ChangeBroadcaster::new(256)),
        })
    }

    /// In-memory state for tests
    pub async fn in_memory() -> AppResult<Self> {
        let db = DbService::new_in_memory().await?;
        Ok(Self {
            config: Config::with_overrides(":memory:", 0),
            db,
            changes: Arc::new(ChangeBroadcaster::new(256)),
        })
    }

    /// Publish a committed mutation to subscribers.
    ///
    /// Best-effort by construction; called after the primary transition has
    /// committed, never before.
    pub fn broadcast_change<T: Serialize>(
        &self,
        resource: &str,
        action: &str,
        id: i64,
        data: Option<&T>,
    ) {
        let version = self.changes.publish(resource, action, id, data);
        tracing::debug!(resource, action, id, version, "Change broadcast");
    }
}
