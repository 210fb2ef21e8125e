//! Infrastructure layer for toolflow.
//!
//! Adapters for the application layer's ports: the built-in capabilities
//! (file operations, content search, meta actions), the registry that routes
//! to them, and TOML configuration loading.

pub mod config;
pub mod tools;

pub use config::{ConfigLoader, FileConfig};
pub use tools::CapabilityRegistry;
