//! Ports — interfaces the application layer depends on.
//!
//! Adapters implementing these live in the infrastructure layer (or in
//! tests as scripted fakes).

pub mod capability;
pub mod hooks;
pub mod model_gateway;

pub use capability::{Capability, CapabilityError, CapabilityRegistryPort, ExecutionContext};
pub use hooks::{ExecutionHooks, NoHooks};
pub use model_gateway::{GatewayError, ModelGateway, ModelSession};
