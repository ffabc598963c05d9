use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tweetgen_common::template::PromptTemplate;
use tweetgen_common::{Provider, Result, TweetRequest};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

/// Sampling settings applied when a caller does not pass its own.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationDefaults {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response to the given prompt with optional system prompt
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse>;

    /// Check if the LLM service is available
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    fn provider(&self) -> Provider;

    fn defaults(&self) -> GenerationDefaults {
        GenerationDefaults::default()
    }

    /// Render the tweet prompt for `request` and send it as-is, with no
    /// system prompt.
    async fn generate_tweets(
        &self,
        template: &PromptTemplate,
        request: &TweetRequest,
    ) -> Result<LlmResponse> {
        let prompt = template.render(request)?;
        tracing::info!(
            provider = %self.provider(),
            model = self.model_name(),
            number = request.number.get(),
            language = %request.language,
            "llm.generate_tweets"
        );
        self.send_prompt(&prompt).await
    }

    /// Send an already rendered prompt using the client's defaults.
    async fn send_prompt(&self, prompt: &str) -> Result<LlmResponse> {
        let defaults = self.defaults();
        tracing::debug!("Prompt: {}", prompt);

        let response = self
            .generate(prompt, None, defaults.max_tokens, defaults.temperature)
            .await?;
        tracing::debug!("LLM response: {}", response.text);
        Ok(response)
    }
}
