use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable subject identifier issued by the identity provider (`sub` claim).
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(sub: impl Into<String>) -> Self {
        UserId(sub.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

/// Claims the identity provider hands over on a successful login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OidcClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: UserId,
    pub email: Option<String>,
    pub name: Option<String>,
    pub nickname: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
    pub last_login: DateTime<Utc>,
}

impl UserProfile {
    pub fn from_claims(claims: OidcClaims, last_login: DateTime<Utc>) -> Self {
        UserProfile {
            user_id: UserId(claims.sub),
            email: claims.email,
            name: claims.name,
            nickname: claims.nickname,
            given_name: claims.given_name,
            family_name: claims.family_name,
            picture: claims.picture,
            last_login,
        }
    }
}
