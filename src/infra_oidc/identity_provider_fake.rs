use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::atomic::{AtomicU64, Ordering};

/// Offline identity provider for local runs.
#[derive(Debug, Default)]
pub struct FakeIdentityProvider {
    issued: AtomicU64,
}

impl FakeIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

// Minimal fake: never rotates, rejects refresh tokens starting with "revoked".
#[async_trait::async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn exchange_refresh_token(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<TokenGrant, IdpError> {
        if refresh_token.0.starts_with("revoked") {
            return Err(IdpError::Rejected {
                status: 400,
                detail: r#"{"error":"invalid_grant"}"#.to_string(),
            });
        }
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TokenGrant {
            access_token: AccessToken(format!("fake-access-token:{}", n)),
            refresh_token: None,
            expires_in: Some(900),
            token_type: Some("Bearer".to_string()),
        })
    }
}
