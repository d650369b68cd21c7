use crate::domain_model::UserId;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type Slots = Arc<DashMap<UserId, Arc<Mutex<()>>>>;

/// Per-user mutual exclusion for token refresh.
///
/// A slot exists only while someone holds or waits for it.
#[derive(Default)]
pub struct RefreshGuards {
    slots: Slots,
}

pub struct RefreshGuard {
    user_id: UserId,
    slots: Slots,
    held: Option<OwnedMutexGuard<()>>,
}

impl RefreshGuards {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, user_id: &UserId) -> RefreshGuard {
        let slot = self.slots.entry(user_id.clone()).or_default().clone();
        // Exists before the wait so a cancelled waiter still cleans up its slot.
        let mut guard = RefreshGuard {
            user_id: user_id.clone(),
            slots: self.slots.clone(),
            held: None,
        };
        guard.held = Some(slot.lock_owned().await);
        guard
    }

    /// Number of users with a refresh in flight or queued.
    pub fn active(&self) -> usize {
        self.slots.len()
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        drop(self.held.take());
        // Only the map's own reference left means no holder and no waiter.
        self.slots
            .remove_if(&self.user_id, |_, slot| Arc::strong_count(slot) == 1);
    }
}
