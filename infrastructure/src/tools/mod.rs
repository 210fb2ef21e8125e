//! Capability adapters and their registry.

pub mod file;
pub mod meta;
pub mod registry;
pub mod search;

pub use registry::CapabilityRegistry;
