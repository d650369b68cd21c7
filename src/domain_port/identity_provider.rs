use crate::domain_model::*;

/// Token set returned by the identity provider's token endpoint.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: AccessToken,
    /// Present only when the provider rotates refresh tokens.
    pub refresh_token: Option<RefreshToken>,
    pub expires_in: Option<u64>,
    pub token_type: Option<String>,
}

#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `grant_type=refresh_token` exchange. No retries.
    async fn exchange_refresh_token(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<TokenGrant, IdpError>;
}

#[derive(Debug, thiserror::Error)]
pub enum IdpError {
    #[error("token endpoint rejected the request with status {status}: {detail}")]
    Rejected { status: u16, detail: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed token response: {0}")]
    MalformedResponse(String),
}
