//! Change notification
//!
//! In-process broadcast of committed mutations, for kitchen displays and
//! floor views that keep a live copy of the venue state. Publishing is
//! best-effort: a send with no subscribers is not an error, and no primary
//! operation ever fails because of a notification.

use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

/// Per-resource version counters
///
/// Lock-free via DashMap; each resource type keeps an independent,
/// atomically incremented version so clients can tell stale payloads from
/// fresh ones.
#[derive(Debug)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// Increment the resource's version and return the new value
    /// (first increment returns 1)
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Current version for a resource, 0 when never published
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

impl Default for ResourceVersions {
    fn default() -> Self {
        Self::new()
    }
}

/// A committed mutation, as seen by subscribers
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    /// Resource type: "order", "kitchen_ticket", "table", ...
    pub resource: String,
    /// "created" | "updated" | "deleted"
    pub action: String,
    /// Entity id
    pub id: i64,
    /// Per-resource monotonic version
    pub version: u64,
    /// Entity snapshot (None for deletions)
    pub data: Option<Value>,
}

/// Broadcast channel plus version bookkeeping
#[derive(Debug)]
pub struct ChangeBroadcaster {
    versions: ResourceVersions,
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            versions: ResourceVersions::new(),
            tx,
        }
    }

    /// Subscribe to change events (slow subscribers may observe lag and
    /// should re-query on `RecvError::Lagged`)
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Publish a committed mutation. Returns the new resource version.
    pub fn publish<T: Serialize>(
        &self,
        resource: &str,
        action: &str,
        id: i64,
        data: Option<&T>,
    ) -> u64 {
        let version = self.versions.increment(resource);
        let event = ChangeEvent {
            resource: resource.to_string(),
            action: action.to_string(),
            id,
            version,
            data: data.and_then(|d| serde_json::to_value(d).ok()),
        };
        // No subscribers is fine
        let _ = self.tx.send(event);
        version
    }

    pub fn version(&self, resource: &str) -> u64 {
        self.versions.get(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_increment_independently() {
        let versions = ResourceVersions::new();
        assert_eq!(versions.get("order"), 0);
        assert_eq!(versions.increment("order"), 1);
        assert_eq!(versions.increment("order"), 2);
        assert_eq!(versions.increment("table"), 1);
        assert_eq!(versions.get("order"), 2);
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = ChangeBroadcaster::new(16);
        let mut rx = bus.subscribe();

        let version = bus.publish("order", "created", 42, Some(&serde_json::json!({"x": 1})));
        assert_eq!(version, 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.resource, "order");
        assert_eq!(event.action, "created");
        assert_eq!(event.id, 42);
        assert_eq!(event.version, 1);
        assert!(event.data.is_some());
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let bus = ChangeBroadcaster::new(16);
        let v1 = bus.publish::<()>("order", "deleted", 7, None);
        let v2 = bus.publish::<()>("order", "deleted", 8, None);
        assert_eq!((v1, v2), (1, 2));
        assert_eq!(bus.version("order"), 2);
    }
}
