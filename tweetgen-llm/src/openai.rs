use crate::http_to_tweetgen;
use crate::traits::{GenerationDefaults, LlmClient, LlmResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tweetgen_common::{LlmConfig, Provider, Result, TweetgenError};
use tweetgen_http::HttpClient;

pub struct OpenAiClient {
    client: HttpClient,
    api_key: String,
    model: String,
    defaults: GenerationDefaults,
}

#[derive(Serialize)]
pub struct ResponsesApiRequest {
    model: String,
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsesApiResponse {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    pub model: String,
    #[serde(default)]
    pub output: Vec<ResponseMessage>,
    #[serde(default)]
    pub usage: Option<ResponseUsage>,
}

/// One element in the `output` array
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Vec<ResponseContent>,
}

/// One part of the message `content`
#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ResponseUsage {
    pub total_tokens: Option<u32>,
}

impl ResponsesApiResponse {
    /// Concatenated `output_text` parts of all message outputs.
    pub fn output_text(&self) -> String {
        self.output
            .iter()
            .filter(|msg| msg.kind == "message")
            .flat_map(|msg| &msg.content)
            .filter(|c| c.kind == "output_text")
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

impl OpenAiClient {
    /// Create a new client for the given API key and model.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::from_config(&LlmConfig {
            model,
            ..LlmConfig::for_provider(Provider::OpenAi, api_key)
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let client = HttpClient::new(&config.endpoint)
            .map_err(|e| TweetgenError::Config(format!("OpenAI endpoint: {e}")))?
            .with_timeout(config.timeout())
            .with_retries(config.retries);

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            defaults: GenerationDefaults {
                max_tokens: config.max_tokens,
                temperature: config.temperature,
            },
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        tracing::debug!(model = %self.model, "Sending OpenAI request");

        let req = ResponsesApiRequest {
            model: self.model.clone(),
            input: prompt.to_string(),
            instructions: system_prompt.map(str::to_string),
            max_output_tokens: max_tokens,
            temperature,
        };

        let resp: ResponsesApiResponse = self
            .client
            .post_json("responses", Some(&self.api_key), &req)
            .await
            .map_err(|e| http_to_tweetgen(Provider::OpenAi, e))?;

        let text = resp.output_text();
        if text.is_empty() {
            return Err(TweetgenError::Provider(format!(
                "No output text in OpenAI response {} (status: {})",
                resp.id,
                resp.status.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(LlmResponse {
            text,
            tokens_used: resp.usage.and_then(|u| u.total_tokens),
            model: Some(resp.model),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn defaults(&self) -> GenerationDefaults {
        self.defaults
    }

    async fn health_check(&self) -> Result<bool> {
        // Simple health check by trying to generate a minimal response
        let test_prompt = "Respond with just 'OK'";

        match self.generate(test_prompt, None, Some(16), None).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("OpenAI health check failed: {}", e);
                Ok(false)
            }
        }
    }
}
