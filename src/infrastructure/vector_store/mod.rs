mod in_memory;
mod lock;
mod persistent;
mod qdrant;

pub use in_memory::InMemoryVectorStore;
pub use lock::IndexLock;
pub use persistent::PersistentVectorStore;
pub use qdrant::QdrantVectorStore;

use std::sync::Arc;

use crate::domain::{ports::VectorStore, DomainError};
use crate::infrastructure::config::{IndexBackend, IndexConfig};

pub async fn build_vector_store(
    config: &IndexConfig,
    dimension: usize,
) -> Result<Arc<dyn VectorStore>, DomainError> {
    match config.backend {
        IndexBackend::File => Ok(Arc::new(PersistentVectorStore::open(&config.path)?)),
        IndexBackend::Qdrant => Ok(Arc::new(
            QdrantVectorStore::new(&config.qdrant_url, &config.collection, dimension).await?,
        )),
    }
}
