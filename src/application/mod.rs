//! Application layer - Use cases and orchestration.
//!
//! Services here orchestrate domain logic over the ports (traits) rather
//! than concrete adapters; the binaries decide which adapters to wire in.

pub mod prompt;
pub mod services;

pub use prompt::{ComposedPrompt, PromptComposer};
pub use services::{ChatAnswer, ChatService, Citation, IngestReport, IngestionService, RagService, SessionService};
