pub mod config;
pub mod embedding;
pub mod llm;
pub mod loader;
pub mod vector_store;

pub use config::Config;
pub use embedding::TextEmbedding;
pub use llm::OpenAiLlm;
pub use loader::{LoadOutcome, PdfLoader, SkippedFile};
pub use vector_store::{
    build_vector_store, InMemoryVectorStore, IndexLock, PersistentVectorStore, QdrantVectorStore,
};
