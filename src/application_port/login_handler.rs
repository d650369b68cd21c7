use crate::domain_model::*;
use crate::domain_port::ProfileStoreError;
use serde::Deserialize;

/// What the identity provider hands back after a successful login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginEvent {
    pub claims: OidcClaims,
    #[serde(default)]
    pub access_token: Option<AccessToken>,
    #[serde(default)]
    pub refresh_token: Option<RefreshToken>,
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("login event carries no subject")]
    MissingSubject,
    #[error("profile store error: {0}")]
    ProfileStore(String),
    #[error("cannot build logout url: {0}")]
    Logout(String),
}

impl From<ProfileStoreError> for LoginError {
    fn from(err: ProfileStoreError) -> Self {
        LoginError::ProfileStore(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait LoginHandler: Send + Sync {
    /// Records the user's profile and stores the token pair from the login.
    async fn on_login_success(&self, event: LoginEvent) -> Result<UserId, LoginError>;

    /// Drops the session and returns the identity provider's logout URL.
    async fn logout(&self, user_id: &UserId, return_to: &str) -> Result<String, LoginError>;
}
