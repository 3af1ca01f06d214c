use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::application::prompt::PromptComposer;
use crate::application::services::{RagService, SessionService};
use crate::domain::{ports::LlmService, DomainError, MessageRole, SearchResult};

/// Generated answer plus the citation data for every passage the model was
/// shown, so callers can verify claims against the source manuals.
#[derive(Debug, Serialize)]
pub struct ChatAnswer {
    pub answer: String,
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Citation {
    pub document: String,
    pub page: usize,
    pub domain: String,
    pub score: f32,
}

impl From<&SearchResult> for Citation {
    fn from(result: &SearchResult) -> Self {
        Self {
            document: result.chunk.metadata.document.clone(),
            page: result.chunk.metadata.page,
            domain: result.chunk.metadata.domain.clone(),
            score: result.score,
        }
    }
}

/// Serving pipeline: retrieve, compose, generate, record the exchange.
pub struct ChatService {
    rag: Arc<RagService>,
    llm: Arc<dyn LlmService>,
    sessions: Arc<SessionService>,
    composer: PromptComposer,
}

impl ChatService {
    pub fn new(
        rag: Arc<RagService>,
        llm: Arc<dyn LlmService>,
        sessions: Arc<SessionService>,
        composer: PromptComposer,
    ) -> Self {
        Self {
            rag,
            llm,
            sessions,
            composer,
        }
    }

    /// Answers one question within a session. The exchange is appended to
    /// the session only after generation succeeds, so a failed call leaves
    /// history untouched and surfaces the error in place of an answer.
    #[instrument(skip(self, question), fields(session = %session_id))]
    pub async fn ask(&self, session_id: Uuid, question: &str) -> Result<ChatAnswer, DomainError> {
        let results = self.rag.retrieve(question).await?;
        let history = self.sessions.history(session_id)?;

        let prompt = self.composer.compose(&results, &history, question);
        let answer = self
            .llm
            .complete_with_system(&prompt.system, &prompt.user)
            .await?;

        self.sessions.append(session_id, MessageRole::User, question)?;
        self.sessions
            .append(session_id, MessageRole::Assistant, &answer)?;

        let citations = results.iter().map(Citation::from).collect();
        Ok(ChatAnswer { answer, citations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{EmbeddingService, VectorStore};
    use crate::domain::{ChunkMetadata, DocumentChunk, Embedding};
    use crate::infrastructure::vector_store::InMemoryVectorStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Routes "voltage" texts and "current" texts to orthogonal vectors.
    struct KeywordEmbedding;

    #[async_trait]
    impl EmbeddingService for KeywordEmbedding {
        async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
            let lower = text.to_lowercase();
            Ok(Embedding::new(if lower.contains("voltage") {
                vec![1.0, 0.0]
            } else {
                vec![0.0, 1.0]
            }))
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

    /// Records the prompts it receives and answers with a fixed string.
    struct RecordingLlm {
        prompts: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl RecordingLlm {
        fn new(fail: bool) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl LlmService for RecordingLlm {
        async fn complete_with_system(
            &self,
            system: &str,
            prompt: &str,
        ) -> Result<String, DomainError> {
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), prompt.to_string()));
            if self.fail {
                return Err(DomainError::generation("provider unavailable"));
            }
            Ok("The maximum cell voltage is 4.2V.".to_string())
        }
    }

    async fn seeded_store() -> Arc<InMemoryVectorStore> {
        let store = Arc::new(InMemoryVectorStore::new());
        let embedder = KeywordEmbedding;

        for (text, page) in [("Max voltage is 4.2V.", 1), ("Max current is 200A.", 2)] {
            let chunk = DocumentChunk::new(
                text,
                0,
                ChunkMetadata::new("manuals/bms.pdf", page, "automotive"),
            );
            let embedding = embedder.embed(text).await.unwrap();
            store.upsert(&[(chunk, embedding)]).await.unwrap();
        }
        store
    }

    fn chat_service(
        llm: Arc<RecordingLlm>,
        store: Arc<InMemoryVectorStore>,
    ) -> (ChatService, Arc<SessionService>) {
        let rag = Arc::new(RagService::new(Arc::new(KeywordEmbedding), store, 1));
        let composer = PromptComposer::new("Use the manuals.\n\n{context}", 10_000).unwrap();
        let sessions = Arc::new(SessionService::new());
        let service = ChatService::new(rag, llm, sessions.clone(), composer);
        (service, sessions)
    }

    #[tokio::test]
    async fn answers_cite_the_retrieved_passage() {
        let llm = Arc::new(RecordingLlm::new(false));
        let (service, _sessions) = chat_service(llm.clone(), seeded_store().await);

        let answer = service
            .ask(Uuid::new_v4(), "What is the max voltage?")
            .await
            .unwrap();

        assert_eq!(answer.citations.len(), 1);
        assert_eq!(answer.citations[0].document, "manuals/bms.pdf");
        assert_eq!(answer.citations[0].page, 1);

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].0.contains("Max voltage is 4.2V."));
    }

    #[tokio::test]
    async fn successful_turns_accumulate_and_feed_the_next_prompt() {
        let llm = Arc::new(RecordingLlm::new(false));
        let (service, sessions) = chat_service(llm.clone(), seeded_store().await);
        let session = sessions.create().unwrap();

        service.ask(session, "What is the max voltage?").await.unwrap();
        service.ask(session, "And the max current?").await.unwrap();

        let prompts = llm.prompts.lock().unwrap();
        assert!(!prompts[0].1.contains("Previous conversation"));
        assert!(prompts[1].1.contains("Previous conversation"));
        assert!(prompts[1].1.contains("What is the max voltage?"));
    }

    #[tokio::test]
    async fn cleared_history_yields_a_prompt_with_zero_prior_turns() {
        let llm = Arc::new(RecordingLlm::new(false));
        let (service, sessions) = chat_service(llm.clone(), seeded_store().await);
        let session = sessions.create().unwrap();

        service.ask(session, "What is the max voltage?").await.unwrap();
        sessions.clear(session).unwrap();
        service.ask(session, "And the max current?").await.unwrap();

        let prompts = llm.prompts.lock().unwrap();
        assert!(!prompts[1].1.contains("Previous conversation"));
    }

    #[tokio::test]
    async fn failed_generation_leaves_history_untouched() {
        let llm = Arc::new(RecordingLlm::new(true));
        let (service, sessions) = chat_service(llm, seeded_store().await);
        let session = sessions.create().unwrap();

        let result = service.ask(session, "What is the max voltage?").await;

        assert!(matches!(result, Err(DomainError::GenerationService(_))));
        assert!(sessions.history(session).unwrap().is_empty());
    }
}
