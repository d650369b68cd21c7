use crate::domain_model::*;
use crate::domain_port::*;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OidcClientConfig {
    pub token_endpoint: Url,
    pub client_id: String,
    pub timeout: Duration,
}

/// Calls the identity provider's token endpoint.
pub struct OidcTokenClient {
    config: OidcClientConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    token_type: Option<String>,
}

impl OidcTokenClient {
    pub fn new(config: OidcClientConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(OidcTokenClient { config, http })
    }

    /// Use a custom HTTP client. Its own timeout settings apply.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }
}

#[async_trait::async_trait]
impl IdentityProvider for OidcTokenClient {
    async fn exchange_refresh_token(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<TokenGrant, IdpError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.config.client_id.as_str()),
            ("refresh_token", refresh_token.0.as_str()),
        ];

        let response = self
            .http
            .post(self.config.token_endpoint.clone())
            .form(&params)
            .send()
            .await
            .map_err(|e| IdpError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(IdpError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response
            .json::<TokenEndpointResponse>()
            .await
            .map_err(|e| IdpError::MalformedResponse(e.to_string()))?;

        let access_token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| IdpError::MalformedResponse("missing access_token".to_string()))?;

        Ok(TokenGrant {
            access_token: AccessToken(access_token),
            refresh_token: body.refresh_token.filter(|t| !t.is_empty()).map(RefreshToken),
            expires_in: body.expires_in,
            token_type: body.token_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OidcTokenClient {
        OidcTokenClient::new(OidcClientConfig {
            token_endpoint: format!("{}/oauth/token", server.uri()).parse().unwrap(),
            client_id: "test-client".to_string(),
            timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn posts_form_encoded_refresh_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("client_id=test-client"))
            .and(body_string_contains("refresh_token=RT1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "AT2",
                "token_type": "Bearer",
                "expires_in": 86400
            })))
            .expect(1)
            .mount(&server)
            .await;

        let grant = client_for(&server)
            .exchange_refresh_token(&RefreshToken::new("RT1"))
            .await
            .unwrap();

        assert_eq!(grant.access_token, AccessToken::new("AT2"));
        assert_eq!(grant.refresh_token, None);
        assert_eq!(grant.expires_in, Some(86400));
        assert_eq!(grant.token_type.as_deref(), Some("Bearer"));
    }

    #[tokio::test]
    async fn returns_rotated_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "AT2",
                "refresh_token": "RT2"
            })))
            .mount(&server)
            .await;

        let grant = client_for(&server)
            .exchange_refresh_token(&RefreshToken::new("RT1"))
            .await
            .unwrap();

        assert_eq!(grant.refresh_token, Some(RefreshToken::new("RT2")));
    }

    #[tokio::test]
    async fn non_success_status_is_a_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .exchange_refresh_token(&RefreshToken::new("RT1"))
            .await
            .unwrap_err();

        match err {
            IdpError::Rejected { status, detail } => {
                assert_eq!(status, 401);
                assert!(detail.contains("invalid_grant"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_without_access_token_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "Bearer"})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .exchange_refresh_token(&RefreshToken::new("RT1"))
            .await
            .unwrap_err();

        assert!(matches!(err, IdpError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn slow_endpoint_hits_the_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "AT2"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = OidcTokenClient::new(OidcClientConfig {
            token_endpoint: format!("{}/oauth/token", server.uri()).parse().unwrap(),
            client_id: "test-client".to_string(),
            timeout: Duration::from_millis(200),
        })
        .unwrap();

        let err = client
            .exchange_refresh_token(&RefreshToken::new("RT1"))
            .await
            .unwrap_err();
        assert!(matches!(err, IdpError::Transport(_)));
    }
}
