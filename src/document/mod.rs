pub mod loader;

pub use loader::{DocumentLoader, LoadOutcome, LoadReport, DEFAULT_PATTERNS};

use std::collections::HashMap;

/// One unit of source content: the extracted text plus its provenance.
/// Immutable once produced by the loader.
#[derive(Debug, Clone)]
pub struct Document {
    pub text: String,
    pub metadata: HashMap<String, String>,
}

impl Document {
    pub fn new(text: String, source: &str) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), source.to_string());
        Self { text, metadata }
    }

    pub fn with_metadata(mut self, key: &str, value: String) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}
