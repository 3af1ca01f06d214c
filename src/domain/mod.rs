pub mod chunker;
pub mod entities;
pub mod errors;
pub mod ports;

pub use chunker::ChunkingConfig;
pub use entities::*;
pub use errors::{DomainError, Result};
