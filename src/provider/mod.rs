//! Remote generation service transport
//!
//! The backend only moves bytes: it never interprets the upstream status.
//! Classification and schema parsing belong to the normalizer.

pub mod mock;
pub mod openrouter;

pub use mock::MockGenerationClient;
pub use openrouter::OpenRouterClient;

use crate::models::GenerationRequest;
use crate::Result;
use async_trait::async_trait;

/// Raw reply from the remote generation service, success or failure.
#[derive(Debug, Clone)]
pub struct RawReply {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Send one composed request and return the raw reply. Errors here are
    /// transport-level only (connection, timeout); HTTP-level failures come
    /// back as a `RawReply` with a non-success status.
    async fn send(&self, request: &GenerationRequest) -> Result<RawReply>;
}
