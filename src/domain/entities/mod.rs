mod conversation;
mod document;
mod embedding;

pub use conversation::{Conversation, Message, MessageRole};
pub use document::{ChunkMetadata, DocumentChunk, Page, SearchResult, SourceDocument};
pub use embedding::Embedding;
