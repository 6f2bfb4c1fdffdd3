use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::providers::traits::LanguageProvider;
use crate::splitter::Chunk;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Index I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Index format error: {0}")]
    Format(#[from] serde_json::Error),
    #[error("Embedding failed: {0}")]
    Embedding(String),
}

/// One persisted (embedding, text, metadata) triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    pub embedding: Vec<f32>,
    pub text: String,
    pub metadata: HashMap<String, String>,
    pub start_index: usize,
}

#[derive(Serialize, Deserialize)]
struct IndexFile {
    /// Recorded for operators; a mismatch between the model that built the
    /// index and the one querying it is NOT detected, similarity scores
    /// against a different model are meaningless.
    embedding_model: String,
    records: Vec<StoredChunk>,
}

const RECORDS_FILE: &str = "records.json";

/// On-disk vector index owned exclusively by this type.
///
/// Rebuilds are wholesale: the previous index directory is removed before
/// the new one is written. The remove-then-recreate step is not atomic;
/// a concurrent reader can observe a missing or partial index.
pub struct VectorStore {
    dir: PathBuf,
    embedding_model: String,
    records: Vec<StoredChunk>,
}

impl VectorStore {
    /// Open an existing index if the directory exists and is non-empty.
    pub fn load_if_present(
        dir: &Path,
        embedding_model: &str,
    ) -> Result<Option<Self>, VectorStoreError> {
        let records_path = dir.join(RECORDS_FILE);
        if !records_path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&records_path)?;
        let index: IndexFile = serde_json::from_str(&raw)?;

        info!(
            "Loaded existing vector store with {} chunks from {}",
            index.records.len(),
            dir.display()
        );
        Ok(Some(Self {
            dir: dir.to_path_buf(),
            embedding_model: embedding_model.to_string(),
            records: index.records,
        }))
    }

    /// Replace any existing index wholesale with embeddings for `chunks`.
    ///
    /// Empty input is a warned no-op that leaves a pre-existing index
    /// untouched and returns `None`. Each chunk costs one embedding call,
    /// made sequentially with no retry.
    pub async fn build(
        dir: &Path,
        embedding_model: &str,
        provider: &dyn LanguageProvider,
        chunks: &[Chunk],
    ) -> Result<Option<Self>, VectorStoreError> {
        if chunks.is_empty() {
            warn!("No chunks to process. Vector store not created.");
            return Ok(None);
        }

        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }

        let mut records = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let embedding = provider
                .generate_embedding(&chunk.text)
                .await
                .map_err(|e| VectorStoreError::Embedding(e.to_string()))?;
            records.push(StoredChunk {
                embedding,
                text: chunk.text.clone(),
                metadata: chunk.metadata.clone(),
                start_index: chunk.start_index,
            });
        }

        fs::create_dir_all(dir)?;
        let index = IndexFile {
            embedding_model: embedding_model.to_string(),
            records,
        };
        fs::write(dir.join(RECORDS_FILE), serde_json::to_string(&index)?)?;

        info!("Created vector store with {} chunks", index.records.len());
        Ok(Some(Self {
            dir: dir.to_path_buf(),
            embedding_model: embedding_model.to_string(),
            records: index.records,
        }))
    }

    /// Top-`k` records by cosine similarity to the query, best first.
    pub async fn search(
        &self,
        provider: &dyn LanguageProvider,
        query: &str,
        k: usize,
    ) -> Result<Vec<(f32, &StoredChunk)>, VectorStoreError> {
        let query_embedding = provider
            .generate_embedding(query)
            .await
            .map_err(|e| VectorStoreError::Embedding(e.to_string()))?;

        let mut scored: Vec<(f32, &StoredChunk)> = self
            .records
            .iter()
            .map(|record| (cosine_similarity(&query_embedding, &record.embedding), record))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
