use anyhow::{anyhow, Result};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequestArgs,
        CreateEmbeddingRequestArgs, EmbeddingInput, Role,
    },
    Client,
};
use async_trait::async_trait;

use crate::config::Settings;
use crate::providers::traits::LanguageProvider;

/// OpenAI-backed provider for both chat completions and embeddings.
///
/// Chat temperature is pinned to 0 so phrasing is deterministic; retrieval
/// determinism still depends on the embedding index contents.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    chat_model: String,
    embedding_model: String,
}

impl OpenAiProvider {
    pub fn new(settings: &Settings) -> Self {
        let config = OpenAIConfig::new().with_api_key(settings.api_key.clone());
        let client = Client::with_config(config);

        Self {
            client,
            chat_model: settings.chat_model.clone(),
            embedding_model: settings.embedding_model.clone(),
        }
    }
}

#[async_trait]
impl LanguageProvider for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.chat_model)
            .temperature(0.0)
            .messages(vec![ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage {
                    role: Role::User,
                    content: ChatCompletionRequestUserMessageContent::Text(prompt.to_string()),
                    name: None,
                },
            )])
            .build()?;

        let response = self.client.chat().create(request).await?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow!("No response content"))
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.embedding_model)
            .input(EmbeddingInput::String(text.to_string()))
            .build()?;

        let response = self.client.embeddings().create(request).await?;

        if let Some(embedding) = response.data.first() {
            Ok(embedding.embedding.clone())
        } else {
            Err(anyhow!("No embedding returned from OpenAI"))
        }
    }

    fn chat_model(&self) -> &str {
        &self.chat_model
    }

    fn embedding_model(&self) -> &str {
        &self.embedding_model
    }
}
