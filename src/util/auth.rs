//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route components should apply identical unauthenticated redirect behavior,
//! and all of them read the same `RwSignal<AuthState>` fed by the provider.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::state::auth::AuthState;

/// Whether a route guard should send the user to `/login`.
///
/// Not while loading, and not while the last check was indeterminate: a
/// flaky network is not a sign-out.
pub fn should_redirect_unauth(state: &AuthState) -> bool {
    !state.loading && !state.indeterminate && state.user.is_none()
}

/// Redirect to `/login` whenever auth has loaded and no user is present.
pub fn install_unauth_redirect<F>(auth: RwSignal<AuthState>, navigate: F)
where
    F: Fn(&str, NavigateOptions) + 'static,
{
    Effect::new(move || {
        let state = auth.get();
        if should_redirect_unauth(&state) {
            navigate("/login", NavigateOptions::default());
        }
    });
}

/// Create the auth signal, provide it as context, and keep it in sync with
/// `provider`.
///
/// The signal starts from the optimistic claims cached in storage, then
/// follows every published snapshot.
#[cfg(feature = "hydrate")]
pub fn bind_auth_signal<K, T>(provider: &crate::state::provider::AuthStateProvider<K, T>) -> RwSignal<AuthState>
where
    K: crate::util::storage::KeyValueStore + 'static,
    T: crate::net::transport::HttpTransport + 'static,
{
    use futures::StreamExt;

    let auth = RwSignal::new(AuthState::default());
    provide_context(auth);

    let mut updates = provider.subscribe();
    let provider = provider.clone();
    leptos::task::spawn_local(async move {
        let optimistic = provider.optimistic_principal().await;
        auth.update(|state| {
            if state.loading {
                *state = AuthState::optimistic(&optimistic);
            }
        });

        let current = provider.get_authentication_state().await;
        auth.update(|state| {
            state.apply(&current);
        });

        while let Some(snapshot) = updates.next().await {
            auth.update(|state| {
                state.apply(&snapshot);
            });
        }
    });
    auth
}
