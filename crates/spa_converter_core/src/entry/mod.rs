//! Entry descriptors and module resolution.

pub mod descriptor;
pub mod loader;
pub mod resolver;
