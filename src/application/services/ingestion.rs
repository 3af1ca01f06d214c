use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::{
    chunker::{self, ChunkingConfig},
    ports::{EmbeddingService, VectorStore},
    DocumentChunk, DomainError, Embedding, SourceDocument,
};
use crate::infrastructure::loader::{PdfLoader, SkippedFile};

/// Per-domain and per-file summary of an ingestion run. Skipped files are
/// listed with their reasons; nothing is dropped silently.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub domains: Vec<DomainSummary>,
    pub skipped: Vec<SkippedFile>,
    pub total_documents: usize,
    pub total_chunks: usize,
}

#[derive(Debug)]
pub struct DomainSummary {
    pub domain: String,
    pub documents: Vec<DocumentSummary>,
}

#[derive(Debug)]
pub struct DocumentSummary {
    pub document: String,
    pub pages: usize,
    pub chunks: usize,
}

/// Offline batch pipeline: load, chunk, embed, index. The sole writer to
/// the vector index; the serving path only reads.
pub struct IngestionService {
    loader: PdfLoader,
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    chunking: ChunkingConfig,
    batch_size: usize,
}

impl IngestionService {
    pub fn new(
        loader: PdfLoader,
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        chunking: ChunkingConfig,
        batch_size: usize,
    ) -> Self {
        Self {
            loader,
            embedding,
            vector_store,
            chunking,
            batch_size: batch_size.max(1),
        }
    }

    /// Ingests every document under the configured root.
    ///
    /// Unreadable files were already skipped by the loader and appear in the
    /// report; embedding or index failures abort the run, since continuing
    /// would leave the store silently incomplete.
    #[instrument(skip(self))]
    pub async fn ingest_all(&self) -> Result<IngestReport, DomainError> {
        let outcome = self.loader.load_all()?;

        let mut report = IngestReport {
            skipped: outcome.skipped,
            ..IngestReport::default()
        };

        for doc in &outcome.documents {
            let chunks = self.index_document(doc).await?;
            report.total_documents += 1;
            report.total_chunks += chunks;

            let summary = DocumentSummary {
                document: doc.path_str(),
                pages: doc.pages.len(),
                chunks,
            };
            match report
                .domains
                .iter_mut()
                .find(|d| d.domain == doc.domain)
            {
                Some(existing) => existing.documents.push(summary),
                None => report.domains.push(DomainSummary {
                    domain: doc.domain.clone(),
                    documents: vec![summary],
                }),
            }
        }

        info!(
            documents = report.total_documents,
            chunks = report.total_chunks,
            skipped = report.skipped.len(),
            "ingestion finished"
        );
        Ok(report)
    }

    /// Chunks and indexes one document, replacing any records previously
    /// stored for the same path. Returns the number of chunks written.
    #[instrument(skip(self, doc), fields(document = %doc.path_str()))]
    pub async fn index_document(&self, doc: &SourceDocument) -> Result<usize, DomainError> {
        let chunks = chunker::split_document(doc, &self.chunking);

        self.vector_store.delete_by_document(&doc.path_str()).await?;

        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<&str> = batch.iter().map(|c| c.content.as_str()).collect();
            let embeddings = self.embedding.embed_batch(&texts).await?;

            let records: Vec<(DocumentChunk, Embedding)> =
                batch.iter().cloned().zip(embeddings).collect();
            self.vector_store.upsert(&records).await?;
        }

        Ok(chunks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Page, SourceDocument};
    use crate::infrastructure::config::IngestionConfig;
    use crate::infrastructure::vector_store::InMemoryVectorStore;
    use async_trait::async_trait;

    /// Maps each text to a tiny deterministic vector so tests need no
    /// network access.
    struct StubEmbedding;

    #[async_trait]
    impl EmbeddingService for StubEmbedding {
        async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
            let len = text.chars().count() as f32;
            Ok(Embedding::new(vec![len, 1.0]))
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            let mut out = Vec::new();
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    fn service(root: &std::path::Path, store: Arc<InMemoryVectorStore>) -> IngestionService {
        let loader = PdfLoader::new(&IngestionConfig {
            root: root.to_path_buf(),
            scaffold_domains: vec!["automotive".to_string()],
        });
        IngestionService::new(
            loader,
            Arc::new(StubEmbedding),
            store,
            ChunkingConfig::default(),
            8,
        )
    }

    fn two_page_doc() -> SourceDocument {
        SourceDocument::new("manuals/bms.pdf", "automotive").with_pages(vec![
            Page::new(1, "Max voltage is 4.2V."),
            Page::new(2, "Max current is 200A."),
        ])
    }

    #[tokio::test]
    async fn small_document_indexes_one_chunk_per_page() {
        let store = Arc::new(InMemoryVectorStore::new());
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path(), store.clone());

        let chunks = service.index_document(&two_page_doc()).await.unwrap();

        assert_eq!(chunks, 2);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn reingesting_a_document_replaces_its_records() {
        let store = Arc::new(InMemoryVectorStore::new());
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path(), store.clone());

        service.index_document(&two_page_doc()).await.unwrap();
        service.index_document(&two_page_doc()).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn skipped_files_appear_in_the_report() {
        let tmp = tempfile::tempdir().unwrap();
        let domain = tmp.path().join("automotive");
        std::fs::create_dir_all(&domain).unwrap();
        std::fs::write(domain.join("broken.pdf"), b"garbage").unwrap();

        let store = Arc::new(InMemoryVectorStore::new());
        let report = service(tmp.path(), store).ingest_all().await.unwrap();

        assert_eq!(report.total_documents, 0);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].path.ends_with("broken.pdf"));
    }

    #[tokio::test]
    async fn missing_root_propagates_setup_required() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryVectorStore::new());
        let service = service(&tmp.path().join("data_vault"), store);

        let result = service.ingest_all().await;
        assert!(matches!(result, Err(DomainError::SetupRequired(_))));
    }
}
