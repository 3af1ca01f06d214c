use std::sync::Arc;

use crate::application::{ChatService, PromptComposer, RagService, SessionService};
use crate::domain::ports::{EmbeddingService, LlmService, VectorStore};
use crate::domain::DomainError;
use crate::infrastructure::vector_store::build_vector_store;
use crate::infrastructure::{Config, OpenAiLlm, TextEmbedding};

/// The whole serving pipeline, wired once at startup and shared by
/// reference with every request handler.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ChatService>,
    pub rag_service: Arc<RagService>,
    pub sessions: Arc<SessionService>,
    pub vector_store: Arc<dyn VectorStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn build(config: Config) -> Result<Self, DomainError> {
        let embedding: Arc<dyn EmbeddingService> =
            Arc::new(TextEmbedding::from_config(&config.embedding));
        let vector_store = build_vector_store(&config.index, embedding.dimension()).await?;

        let rag_service = Arc::new(RagService::new(
            embedding,
            vector_store.clone(),
            config.retrieval.top_k,
        ));
        let sessions = Arc::new(SessionService::new());
        let composer = PromptComposer::from_config(&config.prompt)?;
        let llm: Arc<dyn LlmService> = Arc::new(OpenAiLlm::from_config(&config.llm));
        let chat_service = Arc::new(ChatService::new(
            rag_service.clone(),
            llm,
            sessions.clone(),
            composer,
        ));

        Ok(Self {
            chat_service,
            rag_service,
            sessions,
            vector_store,
            config: Arc::new(config),
        })
    }
}
