//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AuthSnapshot` is the immutable value published by the provider.
//! `AuthState` is its UI projection, held in a Leptos signal and read by route
//! guards and identity-dependent components.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::types::UserClaims;

/// Errors surfaced by the authentication state provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The server rejected the user name or password.
    #[error("invalid user name or password")]
    CredentialsInvalid,

    /// A stored session was rejected by the server.
    #[error("session expired")]
    SessionExpired,

    /// The credential store could not be read or written.
    #[error("credential storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Transport-level failure, timeout, or unexpected server status.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The server broke the response contract.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl AuthError {
    /// Whether retrying later might succeed without user action.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_) | Self::NetworkFailure(_) | Self::MalformedResponse(_))
    }
}

/// Who is signed in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Principal {
    #[default]
    Anonymous,
    User(UserClaims),
}

impl Principal {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }

    pub fn claims(&self) -> Option<&UserClaims> {
        match self {
            Self::User(claims) => Some(claims),
            Self::Anonymous => None,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.claims().is_some_and(|c| c.has_role(role))
    }
}

/// How confident the snapshot is about its principal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthStatus {
    Authenticated,
    /// Confirmed: no session, or the server rejected it.
    #[default]
    Anonymous,
    /// Could not confirm because of a transient failure; retry before
    /// treating the user as signed out.
    Indeterminate,
}

/// Versioned, immutable authentication state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    /// Strictly increasing across published snapshots.
    pub revision: u64,
    pub principal: Principal,
    pub status: AuthStatus,
    /// Failure that made this snapshot indeterminate.
    pub failure: Option<AuthError>,
}

impl AuthSnapshot {
    pub fn authenticated(revision: u64, claims: UserClaims) -> Self {
        Self { revision, principal: Principal::User(claims), status: AuthStatus::Authenticated, failure: None }
    }

    pub fn anonymous(revision: u64) -> Self {
        Self { revision, principal: Principal::Anonymous, status: AuthStatus::Anonymous, failure: None }
    }

    pub fn indeterminate(revision: u64, failure: AuthError) -> Self {
        Self { revision, principal: Principal::Anonymous, status: AuthStatus::Indeterminate, failure: Some(failure) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_authenticated()
    }

    pub fn is_indeterminate(&self) -> bool {
        self.status == AuthStatus::Indeterminate
    }
}

/// UI projection of the auth snapshot tracking the current user and loading status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<UserClaims>,
    /// True until the first snapshot arrives.
    pub loading: bool,
    /// Last snapshot could not confirm the user; keep the current view.
    pub indeterminate: bool,
    /// Revision of the last applied snapshot.
    pub revision: u64,
}

impl Default for AuthState {
    fn default() -> Self {
        Self { user: None, loading: true, indeterminate: false, revision: 0 }
    }
}

impl AuthState {
    /// Project `snapshot`, ignoring anything older than what is already shown.
    ///
    /// Returns `true` when the state changed.
    pub fn apply(&mut self, snapshot: &AuthSnapshot) -> bool {
        if !self.loading && snapshot.revision <= self.revision {
            return false;
        }
        self.user = snapshot.principal.claims().cloned();
        self.loading = false;
        self.indeterminate = snapshot.is_indeterminate();
        self.revision = snapshot.revision;
        true
    }

    /// Optimistic pre-reconciliation view from cached claims; still loading.
    pub fn optimistic(principal: &Principal) -> Self {
        Self { user: principal.claims().cloned(), ..Self::default() }
    }
}
