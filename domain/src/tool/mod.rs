//! Tool catalog module

pub mod entities;

pub use entities::{ToolCatalog, ToolDefinition, ToolParameter};
