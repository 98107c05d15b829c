use serde::{Deserialize, Serialize};
use shopdesk_core::UserId;

use crate::{Privilege, Role};

/// Display identity plus the authorization axes of a signed-in user.
///
/// This is the payload of the persisted identity slot. Field names follow the
/// remote API (`privileges` on the wire, one value).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(rename = "privileges")]
    pub privilege: Privilege,
}

/// Bearer credentials of a session.
///
/// The access token is short-lived; the refresh token is exchanged for a
/// fresh pair by silent renewal.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Token material never ends up in logs.
impl core::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// The authoritative "who is logged in" record.
///
/// Exists iff the user is authenticated. Identity fields are fixed for the
/// lifetime of the record; only the token pair is replaced, by renewal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub identity: UserIdentity,
    pub tokens: TokenPair,
}

impl SessionRecord {
    pub fn new(identity: UserIdentity, tokens: TokenPair) -> Self {
        Self { identity, tokens }
    }
}
