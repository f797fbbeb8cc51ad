//! Responder trait - Dispatcher output interface
//!
//! The abstract "send response" capability. A responder may write to a socket,
//! an in-memory buffer, or a test harness.

use crate::{ContractError, ResponseEnvelope};

/// Response delivery trait
#[trait_variant::make(Responder: Send)]
pub trait LocalResponder {
    /// Responder name (used for logging)
    fn name(&self) -> &str;

    /// Deliver one envelope with its status
    ///
    /// # Errors
    /// Returns delivery error (should include context)
    async fn respond(
        &mut self,
        envelope: &ResponseEnvelope,
        status: u16,
    ) -> Result<(), ContractError>;
}
