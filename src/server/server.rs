use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_oidc::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use anyhow::anyhow;
use sqlx::MySqlPool;
use std::sync::Arc;

pub struct Server {
    pub sessions: Arc<SessionCache>,
    pub token_refresher: Arc<dyn TokenRefresher>,
    pub login_handler: Arc<dyn LoginHandler>,
    pool: Option<MySqlPool>,
}

impl Server {
    pub fn new(
        sessions: Arc<SessionCache>,
        token_refresher: Arc<dyn TokenRefresher>,
        login_handler: Arc<dyn LoginHandler>,
    ) -> Self {
        Self {
            sessions,
            token_refresher,
            login_handler,
            pool: None,
        }
    }

    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let primary: Arc<dyn PrimaryStore> = match settings.session.backend.as_str() {
            "memory" => Arc::new(MemorySessionStore::new()),
            "redis" => {
                let client = redis::Client::open(settings.redis.dsn.as_str())?;
                Arc::new(
                    RedisSessionStore::connect(
                        client,
                        RedisStoreConfig {
                            timeout: settings.redis.timeout(),
                            reconnect_backoff: settings.redis.reconnect_backoff(),
                        },
                    )
                    .await,
                )
            }
            other => return Err(anyhow!("Unknown session backend: {}", other)),
        };

        let sessions = Arc::new(SessionCache::new(
            primary,
            Arc::new(FallbackStore::new()),
            SessionCacheConfig {
                key_prefix: settings.session.key_prefix.clone(),
                ttl: settings.session.ttl(),
            },
        ));

        let identity_provider: Arc<dyn IdentityProvider> = match settings.idp.backend.as_str() {
            "fake" => Arc::new(FakeIdentityProvider::new()),
            "oidc" => Arc::new(OidcTokenClient::new(OidcClientConfig {
                token_endpoint: settings.idp.token_endpoint.parse()?,
                client_id: settings.idp.client_id.clone(),
                timeout: settings.idp.timeout(),
            })?),
            other => return Err(anyhow!("Unknown idp backend: {}", other)),
        };

        let (profiles, pool): (Arc<dyn UserProfileRepo>, Option<MySqlPool>) =
            match settings.user.backend.as_str() {
                "memory" => (Arc::new(MemoryUserProfileRepo::new()), None),
                "mysql" => {
                    let dsn = settings
                        .user
                        .mysql_dsn
                        .as_deref()
                        .ok_or_else(|| anyhow!("user.mysql_dsn is required for the mysql backend"))?;
                    let pool = MySqlPool::connect(dsn).await?;
                    (Arc::new(MySqlUserProfileRepo::new(pool.clone())), Some(pool))
                }
                other => return Err(anyhow!("Unknown user backend: {}", other)),
            };

        let token_refresher: Arc<dyn TokenRefresher> = Arc::new(RealTokenRefresher::new(
            sessions.clone(),
            identity_provider,
        ));
        let login_handler: Arc<dyn LoginHandler> = Arc::new(RealLoginHandler::new(
            profiles,
            sessions.clone(),
            LogoutConfig {
                issuer: settings.idp.issuer.clone(),
                client_id: settings.idp.client_id.clone(),
            },
        ));

        info!(
            session_backend = %settings.session.backend,
            idp_backend = %settings.idp.backend,
            user_backend = %settings.user.backend,
            "server started"
        );

        Ok(Self {
            sessions,
            token_refresher,
            login_handler,
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::*;
    use crate::settings::parse_settings_str;

    const IN_PROCESS: &str = r#"
[http]
address = "127.0.0.1:0"

[idp]
backend = "fake"
issuer = "https://tenant.example.com/"
token_endpoint = "https://tenant.example.com/oauth/token"
client_id = "test-client"

[log]
filter = "info"

[redis]
dsn = "redis://127.0.0.1:6379"

[session]
backend = "memory"

[user]
backend = "memory"
"#;

    #[tokio::test]
    async fn in_process_backends_wire_up_end_to_end() {
        let settings = parse_settings_str(IN_PROCESS).unwrap();
        let server = Server::try_new(&settings).await.unwrap();
        let u1 = UserId::from("u1");

        server
            .sessions
            .save(&u1, Some(AccessToken::new("AT1")), Some(RefreshToken::new("RT1")))
            .await;
        let refreshed = server.token_refresher.refresh(&u1).await.unwrap();

        assert_eq!(
            refreshed.access_token,
            Some(AccessToken::new("fake-access-token:1"))
        );
        assert_eq!(refreshed.refresh_token, Some(RefreshToken::new("RT1")));
        server.shutdown().await;
    }

    #[tokio::test]
    async fn unknown_backend_is_an_error() {
        let toml = IN_PROCESS.replace("backend = \"fake\"", "backend = \"carrier-pigeon\"");
        let settings = parse_settings_str(&toml).unwrap();
        assert!(Server::try_new(&settings).await.is_err());
    }
}
