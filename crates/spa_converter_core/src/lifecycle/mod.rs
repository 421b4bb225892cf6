//! Child instance lifecycle.
//!
//! Owns the loading → ready/error state machine and the attach/detach
//! ordering for a single container.

pub mod controller;
pub mod state;
