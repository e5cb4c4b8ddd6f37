//! Client-side authentication state.
//!
//! DESIGN
//! ======
//! `auth` holds the value types (snapshots, principal, UI projection),
//! `broadcast` fans snapshots out to subscribers, and `provider` is the state
//! machine that produces them.

pub mod auth;
pub mod broadcast;
pub mod provider;
