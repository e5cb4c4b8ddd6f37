//! Authentication state provider: the single source of truth for who is signed in.
//!
//! SYSTEM CONTEXT
//! ==============
//! The provider reconciles three things: the stored session, the server's view
//! of that session (`GET /api/auth`), and an in-memory cached snapshot. UI code
//! reads it through `get_authentication_state` and follows changes through
//! `subscribe`.
//!
//! DESIGN
//! ======
//! - Everything runs on the browser event loop, so shared state lives in
//!   `Rc<RefCell<..>>` and borrows never cross an `.await`.
//! - Concurrent cache misses share one reconciliation future (single flight).
//! - Every state change bumps `revision`. A reconciliation remembers the
//!   revision it started at and is discarded if sign-in, sign-out, or a forced
//!   refresh moved the revision on while it was waiting on the network.
//! - Sign-in, sign-out, and expiry are session transitions. `transition`
//!   records the revision of the latest one; a sign-in or a 401 from another
//!   call that began before it loses to it.
//! - The provider only keeps a weak handle on the in-flight reconciliation.
//!   The future owns an `Rc` to the provider state, so a strong handle here
//!   would keep both alive after every caller has gone.
//!
//! ERROR HANDLING
//! ==============
//! Reads never fail. Transient failures produce an `Indeterminate` snapshot
//! carrying the error; a rejected session is demoted to confirmed anonymous.
//! Only `sign_in` returns errors to the caller.

#[cfg(test)]
#[path = "provider_test.rs"]
mod provider_test;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared, WeakShared};
use log::{debug, error, info, warn};
use serde_json::Value;

use super::auth::{AuthError, AuthSnapshot, Principal};
use super::broadcast::{AuthSubscription, SnapshotBroadcast};
use crate::net::api::{ApiClient, ApiError};
use crate::net::transport::{HttpTransport, Method};
use crate::net::types::{Credentials, StoredSession, UserClaims};
use crate::util::credential_store::CredentialStore;
use crate::util::storage::{KeyValueStore, StorageError};

/// `None` means the result was superseded and the caller should look again.
type Reconciliation = Shared<LocalBoxFuture<'static, Option<Arc<AuthSnapshot>>>>;

struct InFlight {
    started_at: u64,
    future: WeakShared<LocalBoxFuture<'static, Option<Arc<AuthSnapshot>>>>,
}

#[derive(Default)]
struct ProviderState {
    revision: u64,
    /// Revision of the latest sign-in, sign-out, or expiry.
    transition: u64,
    cached: Option<Arc<AuthSnapshot>>,
    stale: bool,
    in_flight: Option<InFlight>,
}

/// Outcome of resolving the current session, before a revision is assigned.
#[derive(Debug)]
enum Resolution {
    Authenticated(UserClaims),
    Anonymous,
    Indeterminate(AuthError),
}

impl Resolution {
    fn into_snapshot(self, revision: u64) -> AuthSnapshot {
        match self {
            Self::Authenticated(claims) => AuthSnapshot::authenticated(revision, claims),
            Self::Anonymous => AuthSnapshot::anonymous(revision),
            Self::Indeterminate(failure) => AuthSnapshot::indeterminate(revision, failure),
        }
    }
}

struct Inner<K, T> {
    store: CredentialStore<K>,
    api: ApiClient<T>,
    state: RefCell<ProviderState>,
    broadcast: SnapshotBroadcast,
}

impl<K, T> Inner<K, T> {
    fn is_current(&self, revision: u64) -> bool {
        self.state.borrow().revision == revision
    }

    /// Move the revision on so in-flight reconciliations are discarded.
    fn invalidate(&self, mark_stale: bool) {
        let mut state = self.state.borrow_mut();
        state.revision += 1;
        state.in_flight = None;
        if mark_stale {
            state.stale = true;
        }
    }

    /// True when a session transition happened after `started_at`.
    fn superseded_since(&self, started_at: u64) -> bool {
        self.state.borrow().transition > started_at
    }

    /// Start a sign-out or expiry: discard in-flight work and fence off
    /// operations that began earlier.
    fn begin_transition(&self) {
        self.invalidate(false);
        let mut state = self.state.borrow_mut();
        state.transition = state.revision;
    }

    /// Install a sign-in result and fence off operations that began earlier.
    fn commit_transition(&self, resolution: Resolution) -> Arc<AuthSnapshot> {
        let snapshot = self.commit(resolution);
        self.state.borrow_mut().transition = snapshot.revision;
        snapshot
    }

    /// Install a new snapshot unconditionally and publish it.
    fn commit(&self, resolution: Resolution) -> Arc<AuthSnapshot> {
        let mut state = self.state.borrow_mut();
        state.in_flight = None;
        self.install(&mut state, resolution)
    }

    /// Install the result of the reconciliation started at `started_at`, unless superseded.
    fn apply(&self, started_at: u64, resolution: Resolution) -> Option<Arc<AuthSnapshot>> {
        let mut state = self.state.borrow_mut();
        if state.revision != started_at {
            debug!("auth: discarding reconciliation from revision {started_at} (now {})", state.revision);
            return None;
        }
        state.in_flight = None;
        Some(self.install(&mut state, resolution))
    }

    fn install(&self, state: &mut ProviderState, resolution: Resolution) -> Arc<AuthSnapshot> {
        state.revision += 1;
        let snapshot = Arc::new(resolution.into_snapshot(state.revision));
        state.cached = Some(Arc::clone(&snapshot));
        state.stale = false;
        self.broadcast.publish(&snapshot);
        snapshot
    }
}

/// Owned handle to the authentication state machine.
///
/// Clones share the same state; pass it to whatever needs auth instead of
/// reaching for a global.
pub struct AuthStateProvider<K, T> {
    inner: Rc<Inner<K, T>>,
}

impl<K, T> Clone for AuthStateProvider<K, T> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<K, T> AuthStateProvider<K, T>
where
    K: KeyValueStore + 'static,
    T: HttpTransport + 'static,
{
    pub fn new(store: CredentialStore<K>, api: ApiClient<T>) -> Self {
        Self {
            inner: Rc::new(Inner {
                store,
                api,
                state: RefCell::new(ProviderState::default()),
                broadcast: SnapshotBroadcast::default(),
            }),
        }
    }

    pub fn api(&self) -> &ApiClient<T> {
        &self.inner.api
    }

    /// Current authentication state.
    ///
    /// Served from cache when fresh; otherwise joins or starts a reconciliation.
    /// Never fails: problems surface as anonymous or indeterminate snapshots.
    pub async fn get_authentication_state(&self) -> Arc<AuthSnapshot> {
        loop {
            let pending = match self.cached_or_reconciliation() {
                Ok(snapshot) => return snapshot,
                Err(pending) => pending,
            };
            if let Some(snapshot) = pending.await {
                return snapshot;
            }
        }
    }

    /// Force a refresh: advance the revision, recompute via the server, and
    /// publish the result to subscribers.
    pub async fn notify_state_changed(&self) -> Arc<AuthSnapshot> {
        self.inner.invalidate(true);
        self.get_authentication_state().await
    }

    /// Sign in with user name and password.
    ///
    /// The login response claims populate the cache directly, so the next read
    /// needs no identity check.
    ///
    /// # Errors
    ///
    /// - `CredentialsInvalid` for blank input or a rejected login
    /// - `NetworkFailure` / `MalformedResponse` when the server is unreachable
    ///   or breaks the contract
    /// - `StorageUnavailable` when the session cannot be persisted
    ///
    /// On error the current state is left untouched. A sign-in overtaken by a
    /// sign-out (or another sign-in) while waiting on the server is abandoned:
    /// its session is logged out best-effort and the newer state is returned.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Arc<AuthSnapshot>, AuthError> {
        if !credentials.is_complete() {
            return Err(AuthError::CredentialsInvalid);
        }
        let started_at = self.inner.state.borrow().revision;

        let resp = self.inner.api.authenticate(credentials).await.map_err(|e| match e {
            ApiError::Unauthorized { .. } | ApiError::Status { status: 400, .. } => AuthError::CredentialsInvalid,
            other => transient_failure(other),
        })?;
        let Some(token) = resp.session_token() else {
            error!("auth: login response carried no session token");
            return Err(AuthError::MalformedResponse("login response carried no session token".to_owned()));
        };

        if self.inner.superseded_since(started_at) {
            info!("auth: sign-in as {} overtaken by a newer session change; abandoning it", resp.claims.user_name);
            if let Err(e) = self.inner.api.logout(Some(&token)).await {
                warn!("auth: could not log out abandoned session: {e}");
            }
            return Ok(self.get_authentication_state().await);
        }

        let stored = StoredSession::new(token, Some(resp.claims.clone()));
        self.inner.store.set(&stored).await.map_err(|e| {
            warn!("auth: could not persist session: {e}");
            AuthError::StorageUnavailable(e.to_string())
        })?;

        info!("auth: signed in as {}", resp.claims.user_name);
        Ok(self.inner.commit_transition(Resolution::Authenticated(resp.claims)))
    }

    /// Sign out locally and on the server.
    ///
    /// Store and network failures are logged and ignored; the result is always
    /// the anonymous principal.
    pub async fn sign_out(&self) -> Arc<AuthSnapshot> {
        self.inner.begin_transition();

        let token = match self.inner.store.get().await {
            Ok(stored) => stored.map(|s| s.token),
            Err(e) => {
                warn!("auth: could not read stored session during sign-out: {e}");
                None
            }
        };
        if let Err(e) = self.inner.store.remove().await {
            warn!("auth: could not clear stored session: {e}");
        }
        if let Err(e) = self.inner.api.logout(token.as_ref()).await {
            warn!("auth: server logout failed: {e}");
        }

        info!("auth: signed out");
        self.inner.commit(Resolution::Anonymous)
    }

    /// Demote to anonymous after another API call reported 401/403.
    pub async fn session_expired(&self) -> Arc<AuthSnapshot> {
        self.inner.begin_transition();
        if let Err(e) = self.inner.store.remove().await {
            warn!("auth: could not clear expired session: {e}");
        }
        info!("auth: session expired");
        self.inner.commit(Resolution::Anonymous)
    }

    /// Call an API route with the stored session attached.
    ///
    /// # Errors
    ///
    /// `SessionExpired` when the server rejects the session (state is demoted
    /// to anonymous first, unless a sign-in or sign-out has happened since the
    /// request began); otherwise the mapped transport/contract error.
    pub async fn authorized_request(&self, method: Method, route: &str, body: Option<&Value>) -> Result<Value, AuthError> {
        let started_at = self.inner.state.borrow().revision;
        let token = match self.inner.store.get().await {
            Ok(stored) => stored.map(|s| s.token),
            Err(StorageError::Corrupt(e)) => {
                warn!("auth: ignoring corrupt stored session: {e}");
                None
            }
            Err(e) => return Err(AuthError::StorageUnavailable(e.to_string())),
        };
        match self.inner.api.send_json(method, route, body, token.as_ref()).await {
            Ok(value) => Ok(value),
            Err(ApiError::Unauthorized { status }) => {
                debug!("auth: {route} answered {status}");
                if self.inner.superseded_since(started_at) {
                    // The rejected token is no longer the stored one.
                    debug!("auth: session changed since {route} was sent; keeping it");
                } else {
                    self.session_expired().await;
                }
                Err(AuthError::SessionExpired)
            }
            Err(e) => Err(transient_failure(e)),
        }
    }

    /// Claims cached in the stored session, without contacting the server.
    ///
    /// Intended for rendering before the first reconciliation finishes.
    pub async fn optimistic_principal(&self) -> Principal {
        match self.inner.store.get().await {
            Ok(Some(StoredSession { claims: Some(claims), .. })) => Principal::User(claims),
            _ => Principal::Anonymous,
        }
    }

    /// Cached snapshot, if any, without reconciling.
    pub fn snapshot(&self) -> Option<Arc<AuthSnapshot>> {
        self.inner.state.borrow().cached.clone()
    }

    /// Follow published snapshots.
    pub fn subscribe(&self) -> AuthSubscription {
        self.inner.broadcast.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.broadcast.subscriber_count()
    }

    fn cached_or_reconciliation(&self) -> Result<Arc<AuthSnapshot>, Reconciliation> {
        let mut state = self.inner.state.borrow_mut();
        if !state.stale {
            if let Some(snapshot) = &state.cached {
                return Ok(Arc::clone(snapshot));
            }
        }
        let started_at = state.revision;
        let joined = state
            .in_flight
            .as_ref()
            .filter(|f| f.started_at == started_at)
            .and_then(|f| f.future.upgrade());
        if let Some(future) = joined {
            return Err(future);
        }

        debug!("auth: starting reconciliation at revision {started_at}");
        let future = reconcile(Rc::clone(&self.inner), started_at).boxed_local().shared();
        state.in_flight = future.downgrade().map(|future| InFlight { started_at, future });
        Err(future)
    }
}

async fn reconcile<K, T>(inner: Rc<Inner<K, T>>, started_at: u64) -> Option<Arc<AuthSnapshot>>
where
    K: KeyValueStore,
    T: HttpTransport,
{
    let resolution = resolve(&inner, started_at).await;
    inner.apply(started_at, resolution)
}

async fn resolve<K, T>(inner: &Inner<K, T>, started_at: u64) -> Resolution
where
    K: KeyValueStore,
    T: HttpTransport,
{
    let stored = match inner.store.get().await {
        Ok(Some(stored)) => stored,
        Ok(None) => return Resolution::Anonymous,
        Err(StorageError::Corrupt(e)) => {
            warn!("auth: discarding corrupt stored session: {e}");
            if let Err(e) = inner.store.remove().await {
                warn!("auth: could not clear corrupt session: {e}");
            }
            return Resolution::Anonymous;
        }
        Err(e) => {
            warn!("auth: credential store unavailable: {e}");
            return Resolution::Indeterminate(AuthError::StorageUnavailable(e.to_string()));
        }
    };

    match inner.api.current_session(&stored.token).await {
        Ok(resp) => {
            if stored.claims.as_ref() != Some(&resp.claims) && inner.is_current(started_at) {
                let refreshed = StoredSession { claims: Some(resp.claims.clone()), ..stored };
                if let Err(e) = inner.store.set(&refreshed).await {
                    warn!("auth: could not refresh cached claims: {e}");
                }
            }
            Resolution::Authenticated(resp.claims)
        }
        Err(ApiError::Unauthorized { status }) => {
            info!("auth: stored session rejected ({status}); signing out locally");
            // A newer sign-in may already have replaced the token.
            if inner.is_current(started_at) {
                if let Err(e) = inner.store.remove().await {
                    warn!("auth: could not clear expired session: {e}");
                }
            }
            Resolution::Anonymous
        }
        Err(e) => Resolution::Indeterminate(transient_failure(e)),
    }
}

fn transient_failure(err: ApiError) -> AuthError {
    match err {
        ApiError::Malformed(msg) => {
            error!("auth: malformed response from server: {msg}");
            AuthError::MalformedResponse(msg)
        }
        ApiError::Network(msg) => {
            warn!("auth: network failure: {msg}");
            AuthError::NetworkFailure(msg)
        }
        ApiError::Status { status, .. } => {
            warn!("auth: unexpected status {status}");
            AuthError::NetworkFailure(format!("unexpected status {status}"))
        }
        ApiError::Unauthorized { status } => AuthError::NetworkFailure(format!("unauthorized: status {status}")),
    }
}
