use crate::domain_model::*;
use std::time::Duration;

/// Remote key-value cache holding session records with a per-key expiration.
///
/// Every failure is reported as [`BackendUnavailable`]; the caller decides how
/// to degrade.
#[async_trait::async_trait]
pub trait PrimaryStore: Send + Sync {
    async fn set(
        &self,
        key: &str,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), BackendUnavailable>;

    /// `Ok(None)` means the store was reachable and holds no such key.
    async fn get(&self, key: &str) -> Result<Option<SessionRecord>, BackendUnavailable>;

    async fn delete(&self, key: &str) -> Result<(), BackendUnavailable>;
}

#[derive(Debug, thiserror::Error)]
pub enum BackendUnavailable {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("serialization failed: {0}")]
    Serialization(String),
}
