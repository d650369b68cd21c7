use super::SessionCache;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::Utc;
use reqwest::Url;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct LogoutConfig {
    /// Identity provider base URL, ending with `/`.
    pub issuer: String,
    pub client_id: String,
}

pub struct RealLoginHandler {
    profiles: Arc<dyn UserProfileRepo>,
    sessions: Arc<SessionCache>,
    logout: LogoutConfig,
}

impl RealLoginHandler {
    pub fn new(
        profiles: Arc<dyn UserProfileRepo>,
        sessions: Arc<SessionCache>,
        logout: LogoutConfig,
    ) -> Self {
        RealLoginHandler {
            profiles,
            sessions,
            logout,
        }
    }

    async fn record_profile(&self, claims: OidcClaims) -> Result<UserId, LoginError> {
        let now = Utc::now();
        let user_id = UserId(claims.sub.clone());

        if self.profiles.find_by_subject(&user_id).await?.is_some() {
            self.profiles.touch_last_login(&user_id, now).await?;
            return Ok(user_id);
        }

        match self
            .profiles
            .insert(&UserProfile::from_claims(claims, now))
            .await
        {
            Ok(()) => {
                info!(%user_id, "new user profile created");
                Ok(user_id)
            }
            // Lost a race with a concurrent first login.
            Err(ProfileStoreError::Duplicate) => {
                self.profiles.touch_last_login(&user_id, now).await?;
                Ok(user_id)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn logout_url(&self, return_to: &str) -> Result<String, LoginError> {
        let base = format!("{}v2/logout", self.logout.issuer);
        let url = Url::parse_with_params(
            &base,
            &[
                ("client_id", self.logout.client_id.as_str()),
                ("returnTo", return_to),
            ],
        )
        .map_err(|e| LoginError::Logout(format!("invalid issuer {base}: {e}")))?;
        Ok(url.into())
    }
}

#[async_trait::async_trait]
impl LoginHandler for RealLoginHandler {
    async fn on_login_success(&self, event: LoginEvent) -> Result<UserId, LoginError> {
        if event.claims.sub.trim().is_empty() {
            return Err(LoginError::MissingSubject);
        }

        let user_id = self.record_profile(event.claims).await?;
        let tier = self
            .sessions
            .save(&user_id, event.access_token, event.refresh_token)
            .await;
        debug!(%user_id, ?tier, "login session stored");

        Ok(user_id)
    }

    async fn logout(&self, user_id: &UserId, return_to: &str) -> Result<String, LoginError> {
        let url = self.logout_url(return_to)?;
        self.sessions.delete(user_id).await;
        info!(%user_id, "session deleted on logout");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{FallbackStore, SessionCacheConfig};
    use crate::infra_memory::{MemorySessionStore, MemoryUserProfileRepo};
    use chrono::Duration;

    struct Harness {
        profiles: Arc<MemoryUserProfileRepo>,
        sessions: Arc<SessionCache>,
        handler: RealLoginHandler,
    }

    fn harness() -> Harness {
        let profiles = Arc::new(MemoryUserProfileRepo::new());
        let sessions = Arc::new(SessionCache::new(
            Arc::new(MemorySessionStore::new()),
            Arc::new(FallbackStore::new()),
            SessionCacheConfig::default(),
        ));
        let handler = RealLoginHandler::new(
            profiles.clone(),
            sessions.clone(),
            LogoutConfig {
                issuer: "https://tenant.example.com/".to_string(),
                client_id: "test-client".to_string(),
            },
        );
        Harness {
            profiles,
            sessions,
            handler,
        }
    }

    fn claims() -> OidcClaims {
        OidcClaims {
            sub: "auth0|12345".to_string(),
            email: Some("test@example.com".to_string()),
            name: Some("Test User".to_string()),
            nickname: Some("Tester".to_string()),
            given_name: Some("Test".to_string()),
            family_name: Some("User".to_string()),
            picture: Some("https://example.com/pic.jpg".to_string()),
        }
    }

    #[tokio::test]
    async fn new_user_gets_profile_and_session() {
        let h = harness();

        let user_id = h
            .handler
            .on_login_success(LoginEvent {
                claims: claims(),
                access_token: Some(AccessToken::new("access-token")),
                refresh_token: None,
            })
            .await
            .unwrap();

        assert_eq!(user_id, UserId::from("auth0|12345"));
        let profile = h.profiles.find_by_subject(&user_id).await.unwrap().unwrap();
        assert_eq!(profile.email.as_deref(), Some("test@example.com"));
        assert_eq!(profile.nickname.as_deref(), Some("Tester"));
        assert_eq!(
            h.sessions.get(&user_id).await,
            Some(SessionRecord::new(Some(AccessToken::new("access-token")), None))
        );
    }

    #[tokio::test]
    async fn returning_user_only_gets_last_login_updated() {
        let h = harness();
        let user_id = UserId::from("auth0|12345");
        let yesterday = Utc::now() - Duration::days(1);
        let mut existing = UserProfile::from_claims(claims(), yesterday);
        existing.name = Some("Old Name".to_string());
        h.profiles.insert(&existing).await.unwrap();

        h.handler
            .on_login_success(LoginEvent {
                claims: claims(),
                access_token: None,
                refresh_token: None,
            })
            .await
            .unwrap();

        let profile = h.profiles.find_by_subject(&user_id).await.unwrap().unwrap();
        assert!(profile.last_login > yesterday);
        assert_eq!(profile.name.as_deref(), Some("Old Name"));
        assert_eq!(
            h.sessions.get(&user_id).await,
            Some(SessionRecord::new(None, None))
        );
    }

    #[tokio::test]
    async fn empty_subject_is_rejected() {
        let h = harness();
        let err = h
            .handler
            .on_login_success(LoginEvent {
                claims: OidcClaims::default(),
                access_token: Some(AccessToken::new("at")),
                refresh_token: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, LoginError::MissingSubject));
    }

    #[tokio::test]
    async fn logout_deletes_session_and_builds_provider_url() {
        let h = harness();
        let user_id = UserId::from("auth0|12345");
        h.sessions
            .save(&user_id, Some(AccessToken::new("AT1")), Some(RefreshToken::new("RT1")))
            .await;

        let url = h
            .handler
            .logout(&user_id, "http://localhost:8080/")
            .await
            .unwrap();

        assert_eq!(
            url,
            "https://tenant.example.com/v2/logout?client_id=test-client&returnTo=http%3A%2F%2Flocalhost%3A8080%2F"
        );
        assert_eq!(h.sessions.get(&user_id).await, None);
    }
}
