use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

#[derive(Debug, Default)]
pub struct MemoryUserProfileRepo {
    profiles: DashMap<UserId, UserProfile>,
}

impl MemoryUserProfileRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserProfileRepo for MemoryUserProfileRepo {
    async fn find_by_subject(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserProfile>, ProfileStoreError> {
        Ok(self.profiles.get(user_id).map(|p| p.value().clone()))
    }

    async fn insert(&self, profile: &UserProfile) -> Result<(), ProfileStoreError> {
        match self.profiles.entry(profile.user_id.clone()) {
            Entry::Occupied(_) => Err(ProfileStoreError::Duplicate),
            Entry::Vacant(slot) => {
                slot.insert(profile.clone());
                Ok(())
            }
        }
    }

    async fn touch_last_login(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), ProfileStoreError> {
        if let Some(mut profile) = self.profiles.get_mut(user_id) {
            profile.last_login = at;
        }
        Ok(())
    }
}
