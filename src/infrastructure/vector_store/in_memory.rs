use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::{ports::VectorStore, DocumentChunk, DomainError, Embedding, SearchResult};

/// Non-persistent store, used in tests and as the search substrate the
/// file-backed store builds on. Records keep insertion order so equal-score
/// ties rank deterministically.
pub struct InMemoryVectorStore {
    records: RwLock<Vec<(DocumentChunk, Embedding)>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn rank(
    records: &[(DocumentChunk, Embedding)],
    query: &Embedding,
    top_k: usize,
) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = records
        .iter()
        .map(|(chunk, embedding)| SearchResult {
            chunk: chunk.clone(),
            score: query.cosine_similarity(embedding),
        })
        .collect();

    // Stable sort: equal scores keep insertion order.
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    results.truncate(top_k);
    results
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, records: &[(DocumentChunk, Embedding)]) -> Result<(), DomainError> {
        let mut store = self
            .records
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        for (chunk, embedding) in records {
            store.retain(|(existing, _)| existing.id != chunk.id);
            store.push((chunk.clone(), embedding.clone()));
        }
        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let store = self
            .records
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        Ok(rank(&store, query, top_k))
    }

    async fn delete_by_document(&self, document: &str) -> Result<(), DomainError> {
        let mut store = self
            .records
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        store.retain(|(chunk, _)| chunk.metadata.document != document);
        Ok(())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let store = self
            .records
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(store.len())
    }
}
