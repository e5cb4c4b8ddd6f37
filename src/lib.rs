//! # authsync-client
//!
//! Browser-side authentication state for a Leptos + WASM single-page app.
//!
//! The crate keeps one answer to "who is signed in" consistent across page
//! reloads, API calls, and any number of UI observers. It wires together a
//! persisted credential store, an API gateway client, and the
//! `AuthStateProvider` state machine that reconciles the two.
//!
//! Browser bindings (`gloo-net` fetch, `localStorage`, console logging) are
//! gated behind the `hydrate` feature; everything else is plain Rust that runs
//! under the native test harness with in-memory collaborators.

pub mod bootstrap;
pub mod config;
pub mod net;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_support;
