use anyhow::{Result, anyhow};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: Http,
    pub idp: Idp,
    pub log: Log,
    pub redis: Redis,
    pub session: Session,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    #[serde(default)]
    pub cert_path: Option<String>,
    #[serde(default)]
    pub key_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Idp {
    pub backend: String, // "fake" or "oidc"
    pub issuer: String,
    pub token_endpoint: String,
    pub client_id: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Redis {
    pub dsn: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_reconnect_backoff_ms")]
    pub reconnect_backoff_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Session {
    pub backend: String, // "memory" or "redis"
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub backend: String, // "memory" or "mysql"
    #[serde(default)]
    pub mysql_dsn: Option<String>,
}

fn default_timeout_ms() -> u64 {
    3_000
}

fn default_reconnect_backoff_ms() -> u64 {
    5_000
}

fn default_key_prefix() -> String {
    "session".to_string()
}

// Thirty days.
const MAX_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

fn default_ttl_secs() -> u64 {
    900
}

impl Idp {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Redis {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_backoff_ms)
    }
}

impl Session {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Settings {
    fn validate(self) -> Result<Self> {
        if self.session.ttl_secs == 0 {
            return Err(anyhow!("session.ttl_secs must be positive"));
        }
        if self.session.ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(anyhow!(
                "session.ttl_secs must not exceed {}",
                MAX_SESSION_TTL_SECS
            ));
        }
        if self.redis.timeout_ms == 0 || self.idp.timeout_ms == 0 {
            return Err(anyhow!("timeouts must be positive"));
        }
        if self.session.key_prefix.is_empty() {
            return Err(anyhow!("session.key_prefix must not be empty"));
        }
        if self.http.cert_path.is_some() != self.http.key_path.is_some() {
            return Err(anyhow!("http.cert_path and http.key_path go together"));
        }
        Ok(self)
    }
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

const ENV_PREFIX: &str = "OSTINATO";

/// Reads the TOML settings file, then `OSTINATO__SECTION__KEY` overrides.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);
    build(File::with_name(path))
}

fn build<S>(source: S) -> Result<Settings>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings: Settings = Config::builder()
        .add_source(source)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator("__"),
        )
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    settings.validate()
}

pub fn parse_settings_str(toml: &str) -> Result<Settings> {
    build(File::from_str(toml, FileFormat::Toml))
}
