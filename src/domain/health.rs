//! Storage reachability probe for liveness/readiness checks

use serde::Serialize;
use tracing::warn;

use crate::storage::Store;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HealthReport {
    Healthy { database: &'static str },
    Unhealthy { error: String },
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthReport::Healthy { .. })
    }
}

/// Never fails: probe errors become an `Unhealthy` report.
pub async fn check(store: &Store) -> HealthReport {
    match store.blocking(|store| store.probe()).await {
        Ok(()) => HealthReport::Healthy {
            database: "connected",
        },
        Err(err) => {
            warn!(db_path = %store.path().display(), error = %err, "storage probe failed");
            HealthReport::Unhealthy {
                error: err.to_string(),
            }
        }
    }
}
