use anyhow::{Context, Result};
use log::{error, info, warn};
use serde::Serialize;
use std::sync::Arc;

use crate::config::Settings;
use crate::document::{DocumentLoader, LoadOutcome, DEFAULT_PATTERNS};
use crate::policy;
use crate::providers::traits::LanguageProvider;
use crate::splitter::TextSplitter;
use crate::store::VectorStore;

/// Answer plus the raw chunk texts that backed it, in retrieval-rank
/// order. Serialized to stdout as one JSON object; never persisted.
#[derive(Debug, Serialize)]
pub struct QueryResult {
    pub answer: String,
    pub sources: Vec<String>,
}

/// Marker reply a compression pass uses to drop an irrelevant chunk.
const NO_OUTPUT: &str = "NO_OUTPUT";

/// One pipeline session: settings, provider, and the currently loaded
/// index. The index is replaced wholesale on rebuild, never mutated in
/// place; holding the session across a rebuild swaps the whole store.
pub struct RagSession {
    settings: Settings,
    provider: Arc<dyn LanguageProvider>,
    splitter: TextSplitter,
    store: Option<VectorStore>,
    compression: bool,
}

impl RagSession {
    /// Construct a session, opening a previously built index when one is
    /// on disk.
    pub fn new(settings: Settings, provider: Arc<dyn LanguageProvider>) -> Result<Self> {
        let store = VectorStore::load_if_present(&settings.index_dir, &settings.embedding_model)
            .context("failed to open the existing vector store")?;
        let splitter = TextSplitter::new(settings.chunk_size, settings.chunk_overlap);

        Ok(Self {
            settings,
            provider,
            splitter,
            store,
            compression: true,
        })
    }

    /// Disable the per-chunk compression pass (one extra chat call per
    /// retrieved chunk).
    pub fn with_compression(mut self, compression: bool) -> Self {
        self.compression = compression;
        self
    }

    pub fn has_index(&self) -> bool {
        self.store.is_some()
    }

    /// Full ingestion cycle: load, split, rebuild the index.
    ///
    /// Per-pattern load failures are reported and skipped; anything that
    /// fails past loading is logged and propagated to the caller.
    pub async fn process_documents(&mut self) -> Result<()> {
        info!("Starting document processing...");

        let loader = DocumentLoader::new(&self.settings.data_dir);
        let (documents, report) = loader.load(&DEFAULT_PATTERNS);
        for (pattern, outcome) in &report.outcomes {
            if let LoadOutcome::Failed(reason) = outcome {
                warn!("Pattern {} skipped: {}", pattern, reason);
            }
        }

        let chunks = self.splitter.split(&documents);

        let built = VectorStore::build(
            &self.settings.index_dir,
            &self.settings.embedding_model,
            self.provider.as_ref(),
            &chunks,
        )
        .await
        .map_err(|e| {
            error!("Error during document processing: {}", e);
            e
        })?;

        // An empty corpus leaves the previous index in place.
        if let Some(store) = built {
            self.store = Some(store);
        }

        info!("Document processing completed successfully!");
        Ok(())
    }

    /// Answer one question against the loaded index.
    ///
    /// Homework-style questions are refused before any retrieval. A
    /// session with no index first runs a full processing cycle; if there
    /// is still nothing to search, a placeholder answer comes back instead
    /// of an error.
    pub async fn answer(&mut self, question: &str, k: usize) -> Result<QueryResult> {
        if policy::is_homework_question(question) {
            return Ok(QueryResult {
                answer: policy::REFUSAL_ANSWER.to_string(),
                sources: Vec::new(),
            });
        }

        if self.store.is_none() {
            info!("Vector store not initialized. Processing documents first...");
            self.process_documents().await?;
        }

        let Some(store) = &self.store else {
            return Ok(QueryResult {
                answer: policy::NO_DOCUMENTS_ANSWER.to_string(),
                sources: Vec::new(),
            });
        };

        info!("Processing question: {}", question);

        let hits = store.search(self.provider.as_ref(), question, k).await?;

        let mut contexts = Vec::new();
        let mut sources = Vec::new();
        for (_, record) in hits {
            if self.compression {
                if let Some(extract) = self.compress_chunk(question, &record.text).await? {
                    contexts.push(extract);
                    sources.push(record.text.clone());
                }
            } else {
                contexts.push(record.text.clone());
                sources.push(record.text.clone());
            }
        }

        let prompt = stuff_prompt(&contexts, question);
        let raw_answer = self.provider.complete(&prompt).await?;

        Ok(QueryResult {
            answer: policy::shape_answer(&raw_answer),
            sources,
        })
    }

    /// Contextual compression: ask the chat model for the span of the
    /// chunk relevant to the question; `None` drops the chunk entirely.
    async fn compress_chunk(&self, question: &str, chunk: &str) -> Result<Option<String>> {
        let prompt = format!(
            "Given the following question and context, extract any part of the context \
             *AS IS* that is relevant to answer the question. If none of the context is \
             relevant return {}.\n\nQuestion: {}\n\nContext:\n>>>\n{}\n>>>\n\n\
             Extracted relevant parts:",
            NO_OUTPUT, question, chunk
        );

        let response = self.provider.complete(&prompt).await?;
        let trimmed = response.trim();
        if trimmed.is_empty() || trimmed == NO_OUTPUT {
            Ok(None)
        } else {
            Ok(Some(trimmed.to_string()))
        }
    }
}

/// Single-prompt "stuff" combination: all retrieved context flows into one
/// chat call.
fn stuff_prompt(contexts: &[String], question: &str) -> String {
    format!(
        "Use the following pieces of context to answer the question at the end. If you \
         don't know the answer, just say that you don't know, don't try to make up an \
         answer.\n\n{}\n\nQuestion: {}\nHelpful Answer:",
        contexts.join("\n\n"),
        question
    )
}
