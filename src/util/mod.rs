//! Utility helpers shared across client modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns (storage, routing
//! guards) from the auth state machine to improve reuse and testability.

pub mod auth;
pub mod credential_store;
pub mod storage;
