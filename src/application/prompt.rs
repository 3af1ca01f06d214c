//! Assembles the retrieved context, conversation history, and current
//! question into the prompt sent to the generation model.

use crate::domain::{DomainError, Message, SearchResult};
use crate::infrastructure::config::PromptConfig;

const CONTEXT_PLACEHOLDER: &str = "{context}";

/// System part plus rendered user part. The system instruction carries the
/// retrieved context; the user part carries prior turns (oldest first) and
/// the current question.
#[derive(Debug, Clone)]
pub struct ComposedPrompt {
    pub system: String,
    pub user: String,
}

pub struct PromptComposer {
    system_template: String,
    max_prompt_chars: usize,
}

impl PromptComposer {
    pub fn new(
        system_template: impl Into<String>,
        max_prompt_chars: usize,
    ) -> Result<Self, DomainError> {
        let system_template = system_template.into();
        if !system_template.contains(CONTEXT_PLACEHOLDER) {
            return Err(DomainError::validation(format!(
                "system template must contain the {CONTEXT_PLACEHOLDER} placeholder"
            )));
        }

        Ok(Self {
            system_template,
            max_prompt_chars,
        })
    }

    pub fn from_config(config: &PromptConfig) -> Result<Self, DomainError> {
        Self::new(&config.system_template, config.max_prompt_chars)
    }

    /// Retrieved context and the current question are always kept; history
    /// is dropped oldest-turn-first until the prompt fits `max_prompt_chars`.
    pub fn compose(
        &self,
        results: &[SearchResult],
        history: &[Message],
        question: &str,
    ) -> ComposedPrompt {
        let context = render_context(results);
        let system = self.system_template.replace(CONTEXT_PLACEHOLDER, &context);
        let system_len = system.chars().count();

        let mut start = 0;
        while start < history.len() {
            let user = render_user(&history[start..], question);
            if system_len + user.chars().count() <= self.max_prompt_chars {
                break;
            }
            start += 1;
        }

        ComposedPrompt {
            system,
            user: render_user(&history[start..], question),
        }
    }
}

fn render_context(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No relevant passages were found in the indexed manuals.".to_string();
    }

    results
        .iter()
        .map(|r| format!("{}\n{}", r.citation_tag(), r.chunk.content))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

fn render_user(history: &[Message], question: &str) -> String {
    if history.is_empty() {
        return question.to_string();
    }

    let turns = history
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Previous conversation:\n{}\n\nCurrent message from user: {}",
        turns, question
    )
}
