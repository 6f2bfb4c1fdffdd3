pub mod openai;
pub mod traits;

pub use openai::OpenAiProvider;
pub use traits::LanguageProvider;

#[cfg(test)]
pub(crate) mod testing {
    use super::traits::LanguageProvider;
    use anyhow::Result;
    use async_trait::async_trait;

    /// Deterministic stand-in for the hosted API, for tests that exercise
    /// the store and the QA pipeline without network access.
    ///
    /// Embeddings are a normalized bag of character trigrams, so identical
    /// texts embed identically and a text always ranks itself first.
    pub struct MockProvider {
        pub reply: String,
    }

    impl MockProvider {
        pub fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
            }
        }
    }

    const MOCK_DIMS: usize = 64;

    /// The trigram-bag embedding shared by every test provider.
    pub fn mock_embedding(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; MOCK_DIMS];
        let chars: Vec<char> = text.chars().collect();
        for window in chars.windows(3) {
            let mut hash = 5381u64;
            for c in window {
                hash = hash.wrapping_mul(33).wrapping_add(*c as u64);
            }
            vector[(hash % MOCK_DIMS as u64) as usize] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }

    #[async_trait]
    impl LanguageProvider for MockProvider {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.reply.clone())
        }

        async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
            Ok(mock_embedding(text))
        }

        fn chat_model(&self) -> &str {
            "mock-chat"
        }

        fn embedding_model(&self) -> &str {
            "mock-embedding"
        }
    }
}
