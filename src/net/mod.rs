//! Networking modules for the auth API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` abstracts the fetch implementation, `cors` decorates every
//! outgoing request, `api` is the typed gateway over the `/api` routes, and
//! `types` defines the wire and persisted schema.

pub mod api;
pub mod cors;
pub mod transport;
pub mod types;
