//! Application layer for toolflow.
//!
//! Orchestrates the domain logic behind ports: the coordinator executes
//! single commands through the capability registry, the turn processor runs
//! the extract/validate/dedup/execute pipeline, and the continuation driver
//! owns the model loop. Everything I/O-shaped is a port; adapters live in
//! the infrastructure layer.

pub mod config;
pub mod ports;
pub mod use_cases;

pub use config::ExecutionParams;
pub use ports::{
    Capability, CapabilityError, CapabilityRegistryPort, ExecutionContext, ExecutionHooks,
    GatewayError, ModelGateway, ModelSession, NoHooks,
};
pub use use_cases::{
    ContinuationDriver, ContinuationOutcome, DriveError, ExecutionCoordinator, TurnOutcome,
    TurnProcessor,
};
