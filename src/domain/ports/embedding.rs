use crate::domain::{errors::DomainError, Embedding};
use async_trait::async_trait;

/// Boundary to the external embedding provider.
///
/// One instance, built from one configuration, must serve both ingestion and
/// query embedding; mixing models makes similarity scores meaningless.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError>;
    fn dimension(&self) -> usize;
}
