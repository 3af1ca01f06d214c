use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::{ChunkingConfig, DomainError};

const DEFAULT_SYSTEM_TEMPLATE: &str = "\
You are a Senior Verification Engineer for an Automotive Battery System. \
Use the provided context to answer the user's request.\n\n\
If the user asks for a test script:\n\
1. Identify numerical limits (voltage, current, temp) from the context.\n\
2. Generate a MATLAB/Simulink test script snippet.\n\
3. Cite the document and page you used.\n\n\
If the exact number is not found in the context, use these defaults: \
Max Voltage: 4.2V, Max Current: 200A, Max Temp: 60C.\n\n\
Context:\n{context}";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalConfig,
    pub index: IndexConfig,
    pub ingestion: IngestionConfig,
    pub prompt: PromptConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Reads the YAML config named by `MANUAL_QA_CONFIG` (default
    /// `config.yaml`). A missing file yields the built-in defaults; a file
    /// that exists but does not parse is an error, not a silent fallback.
    pub fn load() -> Result<Self, DomainError> {
        let path = std::env::var("MANUAL_QA_CONFIG").unwrap_or_else(|_| "config.yaml".into());
        Self::from_file(&path)
    }

    pub fn from_file(path: &str) -> Result<Self, DomainError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_yaml::from_str(&raw)
                .map_err(|e| DomainError::validation(format!("invalid config {path}: {e}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(DomainError::validation(format!(
                "cannot read config {path}: {e}"
            ))),
        }
    }

    pub fn chunking_config(&self) -> Result<ChunkingConfig, DomainError> {
        ChunkingConfig::new(self.chunking.max_size, self.chunking.overlap)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
    pub timeout_seconds: u64,
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
            timeout_seconds: 30,
            batch_size: 64,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f64,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub max_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            max_size: 1000,
            overlap: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    File,
    Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub backend: IndexBackend,
    pub path: PathBuf,
    pub qdrant_url: String,
    pub collection: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::File,
            path: PathBuf::from("./index"),
            qdrant_url: "http://localhost:6334".to_string(),
            collection: "manuals".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub root: PathBuf,
    pub scaffold_domains: Vec<String>,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./data_vault"),
            scaffold_domains: vec!["automotive".to_string(), "finance".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub system_template: String,
    pub max_prompt_chars: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_template: DEFAULT_SYSTEM_TEMPLATE.to_string(),
            max_prompt_chars: 24_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            allowed_origins: Vec::new(),
        }
    }
}
