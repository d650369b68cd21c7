use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshToken(pub String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        AccessToken(token.into())
    }
}

impl RefreshToken {
    pub fn new(token: impl Into<String>) -> Self {
        RefreshToken(token.into())
    }
}

/// Token pair stored per user.
///
/// Both tokens may be null: a record with no access token is still a session,
/// distinct from an absent record. Serialized as
/// `{"accessToken": .., "refreshToken": ..}` with explicit nulls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub access_token: Option<AccessToken>,
    pub refresh_token: Option<RefreshToken>,
}

impl SessionRecord {
    pub fn new(access_token: Option<AccessToken>, refresh_token: Option<RefreshToken>) -> Self {
        SessionRecord {
            access_token,
            refresh_token,
        }
    }
}
