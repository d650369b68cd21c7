use crate::domain_model::SessionRecord;
use crate::domain_port::*;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// In-process [`PrimaryStore`] with per-key expiration.
///
/// Used as the `memory` session backend and as a stand-in for Redis in tests:
/// `set_available(false)` makes every call fail like an unreachable server.
/// Deadlines follow the tokio clock, so paused-time tests can advance past a TTL.
/// A TTL too large to represent as an `Instant` never expires.
pub struct MemorySessionStore {
    entries: DashMap<String, (SessionRecord, Option<Instant>)>,
    available: AtomicBool,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        MemorySessionStore {
            entries: DashMap::new(),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn ensure_available(&self) -> Result<(), BackendUnavailable> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BackendUnavailable::Connection(
                "memory store switched off".to_string(),
            ))
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PrimaryStore for MemorySessionStore {
    async fn set(
        &self,
        key: &str,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), BackendUnavailable> {
        self.ensure_available()?;
        let deadline = Instant::now().checked_add(ttl);
        self.entries
            .insert(key.to_string(), (record.clone(), deadline));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<SessionRecord>, BackendUnavailable> {
        self.ensure_available()?;
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if entry.1.is_none_or(|deadline| deadline > now) => return Ok(Some(entry.0.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries
                .remove_if(key, |_, (_, deadline)| deadline.is_some_and(|d| d <= now));
        }
        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<(), BackendUnavailable> {
        self.ensure_available()?;
        self.entries.remove(key);
        Ok(())
    }
}
