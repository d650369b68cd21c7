use crate::domain_model::*;
use crate::domain_port::IdpError;

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("no refreshable session")]
    RefreshTokenMissing,
    #[error("identity provider rejected the refresh with status {status}: {detail}")]
    IdentityProviderRejected { status: u16, detail: String },
    #[error("transport failure: {0}")]
    TransportFailure(String),
    #[error("malformed token response: {0}")]
    MalformedResponse(String),
}

impl From<IdpError> for RefreshError {
    fn from(err: IdpError) -> Self {
        match err {
            IdpError::Rejected { status, detail } => {
                RefreshError::IdentityProviderRejected { status, detail }
            }
            IdpError::Transport(e) => RefreshError::TransportFailure(e),
            IdpError::MalformedResponse(e) => RefreshError::MalformedResponse(e),
        }
    }
}

#[async_trait::async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Exchanges the stored refresh token and overwrites the session on success.
    /// On any error the stored session is left as it was.
    async fn refresh(&self, user_id: &UserId) -> Result<SessionRecord, RefreshError>;
}
