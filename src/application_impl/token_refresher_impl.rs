use super::{RefreshGuards, SessionCache};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;

/// Refreshes one user at a time. Concurrent callers for the same user queue
/// behind each other and each makes its own identity provider call with
/// whatever refresh token the previous caller left; results are not shared.
pub struct RealTokenRefresher {
    sessions: Arc<SessionCache>,
    identity_provider: Arc<dyn IdentityProvider>,
    guards: RefreshGuards,
}

impl RealTokenRefresher {
    pub fn new(sessions: Arc<SessionCache>, identity_provider: Arc<dyn IdentityProvider>) -> Self {
        RealTokenRefresher {
            sessions,
            identity_provider,
            guards: RefreshGuards::new(),
        }
    }
}

#[async_trait::async_trait]
impl TokenRefresher for RealTokenRefresher {
    async fn refresh(&self, user_id: &UserId) -> Result<SessionRecord, RefreshError> {
        // Read under the guard so a queued caller sees the previous caller's result.
        let _guard = self.guards.lock(user_id).await;

        let current = self
            .sessions
            .get(user_id)
            .await
            .ok_or(RefreshError::RefreshTokenMissing)?;
        let refresh_token = current
            .refresh_token
            .ok_or(RefreshError::RefreshTokenMissing)?;

        let grant = match self
            .identity_provider
            .exchange_refresh_token(&refresh_token)
            .await
        {
            Ok(grant) => grant,
            Err(e) => {
                warn!(%user_id, error = %e, "token refresh failed");
                return Err(e.into());
            }
        };

        let rotated = grant.refresh_token.is_some();
        let updated = SessionRecord::new(
            Some(grant.access_token),
            Some(grant.refresh_token.unwrap_or(refresh_token)),
        );
        let tier = self.sessions.save_record(user_id, updated.clone()).await;
        info!(%user_id, rotated, ?tier, "session token refreshed");

        Ok(updated)
    }
}
