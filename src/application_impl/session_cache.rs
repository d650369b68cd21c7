use super::FallbackStore;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(900);
pub const DEFAULT_KEY_PREFIX: &str = "session";

#[derive(Debug, Clone)]
pub struct SessionCacheConfig {
    pub key_prefix: String,
    pub ttl: Duration,
}

impl Default for SessionCacheConfig {
    fn default() -> Self {
        SessionCacheConfig {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            ttl: DEFAULT_SESSION_TTL,
        }
    }
}

/// Store that served a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Primary,
    Fallback,
}

/// One session per user, kept in the primary store with a TTL and degraded to
/// an in-process map while the primary is unreachable.
///
/// Routing:
///
/// | op     | primary       | result                              |
/// |--------|---------------|-------------------------------------|
/// | save   | ok            | written with TTL                    |
/// | save   | unavailable   | written to fallback, no TTL         |
/// | get    | ok, found     | primary record                      |
/// | get    | ok, not found | absent, fallback is not consulted   |
/// | get    | unavailable   | fallback record, if any             |
/// | delete | ok            | removed from primary only           |
/// | delete | unavailable   | removed from fallback only          |
///
/// A reachable primary is authoritative. Fallback entries are never promoted
/// or reconciled and can resurface during a later outage.
///
/// Nothing here returns an error: backend failures are logged and absorbed.
pub struct SessionCache {
    primary: Arc<dyn PrimaryStore>,
    fallback: Arc<FallbackStore>,
    config: SessionCacheConfig,
}

impl SessionCache {
    pub fn new(
        primary: Arc<dyn PrimaryStore>,
        fallback: Arc<FallbackStore>,
        config: SessionCacheConfig,
    ) -> Self {
        SessionCache {
            primary,
            fallback,
            config,
        }
    }

    fn key(&self, user_id: &UserId) -> String {
        format!("{}:{}", self.config.key_prefix, user_id)
    }

    pub async fn save(
        &self,
        user_id: &UserId,
        access_token: Option<AccessToken>,
        refresh_token: Option<RefreshToken>,
    ) -> Tier {
        self.save_record(user_id, SessionRecord::new(access_token, refresh_token))
            .await
    }

    /// Overwrites whatever is stored for `user_id`.
    pub async fn save_record(&self, user_id: &UserId, record: SessionRecord) -> Tier {
        let key = self.key(user_id);
        match self.primary.set(&key, &record, self.config.ttl).await {
            Ok(()) => Tier::Primary,
            Err(e) => {
                warn!(%user_id, error = %e, "primary store unavailable, saving session to fallback");
                self.fallback.insert(&key, record);
                Tier::Fallback
            }
        }
    }

    pub async fn get(&self, user_id: &UserId) -> Option<SessionRecord> {
        self.lookup(user_id).await.0
    }

    /// Like [`SessionCache::get`], also reporting which store answered.
    pub async fn lookup(&self, user_id: &UserId) -> (Option<SessionRecord>, Tier) {
        let key = self.key(user_id);
        match self.primary.get(&key).await {
            Ok(record) => (record, Tier::Primary),
            Err(e) => {
                warn!(%user_id, error = %e, "primary store unavailable, reading session from fallback");
                (self.fallback.get(&key), Tier::Fallback)
            }
        }
    }

    pub async fn delete(&self, user_id: &UserId) -> Tier {
        let key = self.key(user_id);
        match self.primary.delete(&key).await {
            Ok(()) => Tier::Primary,
            Err(e) => {
                warn!(%user_id, error = %e, "primary store unavailable, deleting session from fallback");
                self.fallback.remove(&key);
                Tier::Fallback
            }
        }
    }
}
