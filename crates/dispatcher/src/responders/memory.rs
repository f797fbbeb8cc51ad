//! MemoryResponder - keeps every response in memory

use contracts::{ContractError, DispatchResponse, Responder, ResponseEnvelope};

/// Responder that records responses, for hosts that build their own reply
/// and for tests
#[derive(Debug, Default)]
pub struct MemoryResponder {
    name: String,
    responses: Vec<DispatchResponse>,
}

impl MemoryResponder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: Vec::new(),
        }
    }

    /// All recorded responses, oldest first
    pub fn responses(&self) -> &[DispatchResponse] {
        &self.responses
    }

    /// Most recent response
    pub fn last(&self) -> Option<&DispatchResponse> {
        self.responses.last()
    }

    /// Take recorded responses, leaving the responder empty
    pub fn take(&mut self) -> Vec<DispatchResponse> {
        std::mem::take(&mut self.responses)
    }
}

impl Responder for MemoryResponder {
    fn name(&self) -> &str {
        &self.name
    }

    async fn respond(
        &mut self,
        envelope: &ResponseEnvelope,
        status: u16,
    ) -> Result<(), ContractError> {
        self.responses.push(DispatchResponse {
            status,
            envelope: envelope.clone(),
        });
        Ok(())
    }
}
