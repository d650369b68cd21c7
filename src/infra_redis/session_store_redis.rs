use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, FromRedisValue, RedisError, RedisResult, Value};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Upper bound for connecting and for every single command.
    pub timeout: Duration,
    /// Minimum wait between reconnect attempts after a failed connect.
    pub reconnect_backoff: Duration,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        RedisStoreConfig {
            timeout: Duration::from_secs(3),
            reconnect_backoff: Duration::from_secs(5),
        }
    }
}

struct ConnState {
    conn: Option<ConnectionManager>,
    last_failure: Option<Instant>,
}

/// [`PrimaryStore`] backed by Redis (`SET key value EX ttl`, `GET`, `DEL`).
///
/// The connection is established lazily, so the service starts even when
/// Redis is down. Once connected, the `ConnectionManager` handles reconnects.
pub struct RedisSessionStore {
    client: redis::Client,
    state: Mutex<ConnState>,
    config: RedisStoreConfig,
}

impl RedisSessionStore {
    pub fn new(client: redis::Client, config: RedisStoreConfig) -> Self {
        RedisSessionStore {
            client,
            state: Mutex::new(ConnState {
                conn: None,
                last_failure: None,
            }),
            config,
        }
    }

    /// Like [`RedisSessionStore::new`] but tries to connect right away.
    pub async fn connect(client: redis::Client, config: RedisStoreConfig) -> Self {
        let store = Self::new(client, config);
        if let Err(e) = store.connection().await {
            warn!(error = %e, "redis unreachable at startup, running in fallback mode");
        }
        store
    }

    async fn connection(&self) -> Result<ConnectionManager, BackendUnavailable> {
        {
            let state = self.lock_state()?;
            if let Some(conn) = &state.conn {
                return Ok(conn.clone());
            }
            if let Some(at) = state.last_failure {
                if at.elapsed() < self.config.reconnect_backoff {
                    return Err(BackendUnavailable::Connection(
                        "redis unreachable, reconnect pending".to_string(),
                    ));
                }
            }
        }

        let attempt =
            tokio::time::timeout(self.config.timeout, self.client.get_connection_manager()).await;

        let mut state = self.lock_state()?;
        match attempt {
            Ok(Ok(conn)) => {
                info!("connected to redis");
                state.conn = Some(conn.clone());
                state.last_failure = None;
                Ok(conn)
            }
            Ok(Err(e)) => {
                state.last_failure = Some(Instant::now());
                Err(map_redis_error(e))
            }
            Err(_) => {
                state.last_failure = Some(Instant::now());
                Err(BackendUnavailable::Timeout(self.config.timeout))
            }
        }
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, ConnState>, BackendUnavailable> {
        self.state
            .lock()
            .map_err(|_| BackendUnavailable::Connection("connection state poisoned".to_string()))
    }

    async fn bounded<T>(
        &self,
        op: impl Future<Output = RedisResult<T>>,
    ) -> Result<T, BackendUnavailable> {
        match tokio::time::timeout(self.config.timeout, op).await {
            Ok(result) => result.map_err(map_redis_error),
            Err(_) => Err(BackendUnavailable::Timeout(self.config.timeout)),
        }
    }
}

fn map_redis_error(err: RedisError) -> BackendUnavailable {
    match err.kind() {
        redis::ErrorKind::TypeError => BackendUnavailable::Serialization(err.to_string()),
        _ => BackendUnavailable::Connection(err.to_string()),
    }
}

impl FromRedisValue for SessionRecord {
    fn from_redis_value(v: &Value) -> RedisResult<Self> {
        let s: String = redis::from_redis_value(v)?;
        let record = serde_json::from_str::<SessionRecord>(&s).map_err(|e| {
            RedisError::from((
                redis::ErrorKind::TypeError,
                "invalid session record",
                e.to_string(),
            ))
        })?;
        Ok(record)
    }
}

#[async_trait::async_trait]
impl PrimaryStore for RedisSessionStore {
    async fn set(
        &self,
        key: &str,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), BackendUnavailable> {
        let payload = serde_json::to_string(record)
            .map_err(|e| BackendUnavailable::Serialization(e.to_string()))?;
        let mut conn = self.connection().await?;
        let _: () = self
            .bounded(conn.set_ex(key, payload, ttl.as_secs().max(1)))
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<SessionRecord>, BackendUnavailable> {
        let mut conn = self.connection().await?;
        let record: Option<SessionRecord> = self.bounded(conn.get(key)).await?;
        Ok(record)
    }

    async fn delete(&self, key: &str) -> Result<(), BackendUnavailable> {
        let mut conn = self.connection().await?;
        let _: () = self.bounded(conn.del(key)).await?;
        Ok(())
    }
}
