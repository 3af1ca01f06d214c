use crate::domain::errors::DomainError;
use async_trait::async_trait;

/// Boundary to the external text-generation provider. Output is returned
/// verbatim; retry policy belongs to the caller.
#[async_trait]
pub trait LlmService: Send + Sync {
    async fn complete_with_system(&self, system: &str, prompt: &str)
        -> Result<String, DomainError>;
}
