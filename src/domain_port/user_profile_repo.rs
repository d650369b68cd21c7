use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[async_trait::async_trait]
pub trait UserProfileRepo: Send + Sync {
    async fn find_by_subject(&self, user_id: &UserId)
    -> Result<Option<UserProfile>, ProfileStoreError>;

    /// Fails with [`ProfileStoreError::Duplicate`] when the subject already exists.
    async fn insert(&self, profile: &UserProfile) -> Result<(), ProfileStoreError>;

    async fn touch_last_login(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), ProfileStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileStoreError {
    #[error("profile already exists")]
    Duplicate,
    #[error("store error: {0}")]
    Store(String),
}
