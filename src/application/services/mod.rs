mod chat;
mod ingestion;
mod rag;
mod session;

pub use chat::{ChatAnswer, ChatService, Citation};
pub use ingestion::{DocumentSummary, DomainSummary, IngestReport, IngestionService};
pub use rag::RagService;
pub use session::SessionService;
