use anyhow::Result;
use async_trait::async_trait;

/// Hosted language-model access: chat completion and text embedding.
///
/// Both calls are attempted exactly once; there is no retry layer here, a
/// transient API failure surfaces to the caller.
#[async_trait]
pub trait LanguageProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>>;

    fn chat_model(&self) -> &str;

    fn embedding_model(&self) -> &str;
}
