use crate::domain::{errors::DomainError, DocumentChunk, Embedding, SearchResult};
use async_trait::async_trait;

/// Persistent store of (chunk, vector) records with nearest-neighbor search.
///
/// `search` ranks by similarity, ties broken by insertion order. Deletion is
/// keyed by document path so re-ingesting a file replaces its records.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(&self, records: &[(DocumentChunk, Embedding)]) -> Result<(), DomainError>;
    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError>;
    async fn delete_by_document(&self, document: &str) -> Result<(), DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
}
