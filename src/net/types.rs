//! Wire and persisted DTOs for the auth API.
//!
//! DESIGN
//! ======
//! Field names mirror the server's camelCase JSON so serde round-trips stay
//! lossless. Optional fields default when absent, which keeps stored sessions
//! written by an older build readable by a newer one.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// Schema version written into every stored session.
pub const STORED_SESSION_VERSION: u32 = 1;

/// Credentials submitted to `POST /api/auth`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Auth provider name; always `"credentials"` for user name + password.
    pub provider: String,
    pub user_name: String,
    pub password: String,
    /// Ask the server for a long-lived session.
    pub remember_me: bool,
}

impl Credentials {
    /// User name + password credentials with `rememberMe` enabled.
    pub fn new(user_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self { provider: "credentials".to_owned(), user_name: user_name.into(), password: password.into(), remember_me: true }
    }

    /// Whether both user name and password are non-blank.
    pub fn is_complete(&self) -> bool {
        !self.user_name.trim().is_empty() && !self.password.is_empty()
    }
}

/// Identity claims for a signed-in user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserClaims {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub profile_url: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl UserClaims {
    /// Name suitable for display: `displayName`, else `userName`.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.user_name)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Claims must identify someone; an empty id and name is a contract violation.
    pub fn is_identified(&self) -> bool {
        !self.user_id.is_empty() || !self.user_name.is_empty()
    }
}

/// Body returned by `POST /api/auth` and `GET /api/auth`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateResponse {
    #[serde(flatten)]
    pub claims: UserClaims,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub bearer_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl AuthenticateResponse {
    /// Session token carried by a login response.
    ///
    /// Prefers the bearer token; falls back to the server session id.
    pub fn session_token(&self) -> Option<SessionToken> {
        if let Some(token) = self.bearer_token.as_deref().filter(|t| !t.is_empty()) {
            return Some(SessionToken::Bearer { token: token.to_owned(), refresh_token: self.refresh_token.clone() });
        }
        self.session_id.as_deref().filter(|id| !id.is_empty()).map(|id| SessionToken::Session { id: id.to_owned() })
    }
}

/// Credential proving an authenticated session to the server.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionToken {
    /// Bearer token sent in the `Authorization` header.
    Bearer {
        token: String,
        #[serde(default)]
        refresh_token: Option<String>,
    },
    /// Server session id sent in the `X-ss-id` header.
    Session { id: String },
}

impl SessionToken {
    /// Header name and value that attach this token to a request.
    pub fn header(&self) -> (&'static str, String) {
        match self {
            Self::Bearer { token, .. } => ("Authorization", format!("Bearer {token}")),
            Self::Session { id } => ("X-ss-id", id.clone()),
        }
    }
}

// Tokens end up in logs through `{:?}` on larger structs; keep the secret out.
impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer { .. } => f.write_str("SessionToken::Bearer(..)"),
            Self::Session { .. } => f.write_str("SessionToken::Session(..)"),
        }
    }
}

/// The single persisted entry: token plus optional cached claims.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default = "stored_session_version")]
    pub version: u32,
    pub token: SessionToken,
    /// Claims from the last confirmed identity, for optimistic rendering.
    #[serde(default)]
    pub claims: Option<UserClaims>,
}

impl StoredSession {
    pub fn new(token: SessionToken, claims: Option<UserClaims>) -> Self {
        Self { version: STORED_SESSION_VERSION, token, claims }
    }
}

fn stored_session_version() -> u32 {
    STORED_SESSION_VERSION
}
