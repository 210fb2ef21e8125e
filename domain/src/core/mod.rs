//! Core domain primitives.

pub mod string;
