pub mod config;
pub mod document;
pub mod ingest;
pub mod pipeline;
pub mod policy;
pub mod providers;
pub mod splitter;
pub mod store;

// Re-export commonly used items
pub use config::Settings;
pub use pipeline::{QueryResult, RagSession};
pub use providers::OpenAiProvider;
