//! Session module

pub mod entities;

pub use entities::{Role, TurnMessage};
