//! Child module contract.
//!
//! Describes what a loaded child must export, how its lifecycle handle is
//! shaped, and how the loader decides whether to accept it.

pub mod define;
pub mod handle;
pub mod module;
pub mod validator;
