use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::domain::{ports::VectorStore, DocumentChunk, DomainError, Embedding, SearchResult};
use crate::infrastructure::vector_store::in_memory::rank;

const RECORDS_FILE: &str = "records.jsonl";
const TEMP_FILE: &str = "records.jsonl.tmp";

#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    chunk: DocumentChunk,
    vector: Vec<f32>,
}

/// File-backed store: one JSON record per line under the configured index
/// directory, loaded fully at open. Every mutation rewrites the file through
/// a temp-and-rename so a crash mid-write never leaves a partial index.
pub struct PersistentVectorStore {
    dir: PathBuf,
    records: RwLock<Vec<(DocumentChunk, Embedding)>>,
}

impl PersistentVectorStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            DomainError::index(format!("cannot create index at {}: {e}", dir.display()))
        })?;

        let records = load_records(&dir.join(RECORDS_FILE))?;
        Ok(Self {
            dir,
            records: RwLock::new(records),
        })
    }

    fn persist(&self, records: &[(DocumentChunk, Embedding)]) -> Result<(), DomainError> {
        let temp = self.dir.join(TEMP_FILE);
        let target = self.dir.join(RECORDS_FILE);

        let mut file = File::create(&temp).map_err(|e| {
            DomainError::index(format!("cannot write {}: {e}", temp.display()))
        })?;

        for (chunk, embedding) in records {
            let record = StoredRecord {
                chunk: chunk.clone(),
                vector: embedding.as_slice().to_vec(),
            };
            let line = serde_json::to_string(&record)
                .map_err(|e| DomainError::index(e.to_string()))?;
            writeln!(file, "{line}").map_err(|e| {
                DomainError::index(format!("cannot write {}: {e}", temp.display()))
            })?;
        }

        file.sync_all()
            .map_err(|e| DomainError::index(format!("cannot sync {}: {e}", temp.display())))?;
        fs::rename(&temp, &target).map_err(|e| {
            DomainError::index(format!("cannot commit {}: {e}", target.display()))
        })?;
        Ok(())
    }
}

fn load_records(path: &Path) -> Result<Vec<(DocumentChunk, Embedding)>, DomainError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(DomainError::index(format!(
                "cannot open {}: {e}",
                path.display()
            )))
        }
    };

    let mut records = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line =
            line.map_err(|e| DomainError::index(format!("cannot read {}: {e}", path.display())))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: StoredRecord = serde_json::from_str(&line).map_err(|e| {
            DomainError::index(format!(
                "corrupt index record at {}:{}: {e}",
                path.display(),
                line_no + 1
            ))
        })?;
        records.push((record.chunk, Embedding::new(record.vector)));
    }
    Ok(records)
}

#[async_trait]
impl VectorStore for PersistentVectorStore {
    async fn upsert(&self, records: &[(DocumentChunk, Embedding)]) -> Result<(), DomainError> {
        let mut store = self
            .records
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut next = store.clone();
        for (chunk, embedding) in records {
            next.retain(|(existing, _)| existing.id != chunk.id);
            next.push((chunk.clone(), embedding.clone()));
        }

        // Persist first; memory only reflects what made it to disk.
        self.persist(&next)?;
        *store = next;
        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let store = self
            .records
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        Ok(rank(&store, query, top_k))
    }

    async fn delete_by_document(&self, document: &str) -> Result<(), DomainError> {
        let mut store = self
            .records
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let next: Vec<_> = store
            .iter()
            .filter(|(chunk, _)| chunk.metadata.document != document)
            .cloned()
            .collect();

        if next.len() != store.len() {
            self.persist(&next)?;
            *store = next;
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let store = self
            .records
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(store.len())
    }
}
