use crate::domain_model::SessionRecord;
use dashmap::DashMap;

/// In-process session map used while the primary store is unreachable.
///
/// Entries carry no expiration; they live until removed or the process exits.
#[derive(Debug, Default)]
pub struct FallbackStore {
    entries: DashMap<String, SessionRecord>,
}

impl FallbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, record: SessionRecord) {
        self.entries.insert(key.to_string(), record);
    }

    pub fn get(&self, key: &str) -> Option<SessionRecord> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, key: &str) -> Option<SessionRecord> {
        self.entries.remove(key).map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
