use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Pipeline settings resolved once at startup.
///
/// Every path is fixed for the lifetime of the process; nothing is
/// re-read from the environment after construction.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub data_dir: PathBuf,
    pub index_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub chat_model: String,
    pub embedding_model: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Settings {
    /// Resolve settings from the process environment.
    ///
    /// A missing `OPENAI_API_KEY` is a configuration error and fails here,
    /// before any pipeline component is constructed.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY must be set before the pipeline can run")?;

        let data_dir = env::var("RAG_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let index_dir = env::var("RAG_INDEX_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("index"));

        let uploads_dir = env::var("RAG_UPLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));

        let processed_dir = env::var("RAG_PROCESSED_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("processed"));

        let chat_model = env::var("OPENAI_CHAT_MODEL")
            .unwrap_or_else(|_| "gpt-3.5-turbo".to_string());

        let embedding_model = env::var("OPENAI_EMBEDDING_MODEL")
            .unwrap_or_else(|_| "text-embedding-ada-002".to_string());

        let chunk_size = env::var("RAG_CHUNK_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1000);

        let chunk_overlap = env::var("RAG_CHUNK_OVERLAP")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(200);

        Ok(Self {
            api_key,
            data_dir,
            index_dir,
            uploads_dir,
            processed_dir,
            chat_model,
            embedding_model,
            chunk_size,
            chunk_overlap,
        })
    }
}
