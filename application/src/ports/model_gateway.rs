//! Model gateway port
//!
//! Defines how the application layer talks to the language model. The
//! continuation driver only needs plain text in and text out; extraction of
//! commands from the response happens in the domain layer.

use async_trait::async_trait;

/// Errors the gateway can produce.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("session closed")]
    SessionClosed,
}

/// An open conversation with the model.
#[async_trait]
pub trait ModelSession: Send + Sync {
    /// Send a prompt and return the raw response text.
    async fn send(&mut self, prompt: &str) -> Result<String, GatewayError>;
}

/// Port for creating model sessions.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn create_session(
        &self,
        system_prompt: &str,
    ) -> Result<Box<dyn ModelSession>, GatewayError>;
}
