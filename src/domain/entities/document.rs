use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// A source file loaded from the ingestion tree, with its extracted pages.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub domain: String,
    pub pages: Vec<Page>,
}

impl SourceDocument {
    pub fn new(path: impl Into<PathBuf>, domain: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            domain: domain.into(),
            pages: Vec::new(),
        }
    }

    pub fn with_pages(mut self, pages: Vec<Page>) -> Self {
        self.pages = pages;
        self
    }

    pub fn path_str(&self) -> String {
        self.path.display().to_string()
    }
}

/// One physical page of extracted text. Page numbers are 1-based.
#[derive(Debug, Clone)]
pub struct Page {
    pub number: usize,
    pub text: String,
}

impl Page {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// Fixed metadata record carried by every chunk and every index entry.
///
/// Typed rather than a free-form map so that a citation always resolves to a
/// real document path, page number, and domain tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub document: String,
    pub page: usize,
    pub domain: String,
}

impl ChunkMetadata {
    pub fn new(
        document: impl Into<String>,
        page: usize,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            document: document.into(),
            page,
            domain: domain.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: Uuid,
    pub content: String,
    pub chunk_index: usize,
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    pub fn new(content: impl Into<String>, chunk_index: usize, metadata: ChunkMetadata) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            chunk_index,
            metadata,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: DocumentChunk,
    pub score: f32,
}

impl SearchResult {
    /// Citation tag used when rendering retrieved context into a prompt.
    pub fn citation_tag(&self) -> String {
        format!(
            "[{} p.{} | {}]",
            self.chunk.metadata.document, self.chunk.metadata.page, self.chunk.metadata.domain
        )
    }
}
