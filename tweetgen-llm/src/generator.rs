//! Template → provider → text.
use crate::traits::LlmClient;
use std::collections::HashMap;
use std::sync::Arc;
use tweetgen_common::template::PromptTemplate;
use tweetgen_common::{Generation, Provider, Result, TweetRequest, TweetgenError};

pub type SharedClient = Arc<dyn LlmClient + Send + Sync + 'static>;

/// Per-provider state: a ready client, or why the provider cannot be used.
#[derive(Clone)]
pub enum ProviderSlot {
    Ready(SharedClient),
    Unavailable(String),
}

/// Renders tweet prompts and sends them to the selected provider.
#[derive(Clone)]
pub struct TweetGenerator {
    template: PromptTemplate,
    slots: HashMap<Provider, ProviderSlot>,
}

impl TweetGenerator {
    pub fn new(template: PromptTemplate) -> Self {
        Self {
            template,
            slots: HashMap::new(),
        }
    }

    /// Register a client under the provider it reports.
    pub fn with_client(mut self, client: SharedClient) -> Self {
        self.slots
            .insert(client.provider(), ProviderSlot::Ready(client));
        self
    }

    /// Mark `provider` as unusable, e.g. because its API key is missing.
    pub fn with_unavailable(mut self, provider: Provider, reason: impl Into<String>) -> Self {
        self.slots
            .insert(provider, ProviderSlot::Unavailable(reason.into()));
        self
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    /// `None` when the provider has a ready client.
    pub fn unavailable_reason(&self, provider: Provider) -> Option<String> {
        match self.slots.get(&provider) {
            Some(ProviderSlot::Ready(_)) => None,
            Some(ProviderSlot::Unavailable(reason)) => Some(reason.clone()),
            None => Some(format!("{} is not configured", provider.label())),
        }
    }

    pub fn client(&self, provider: Provider) -> Result<SharedClient> {
        match self.slots.get(&provider) {
            Some(ProviderSlot::Ready(client)) => Ok(client.clone()),
            _ => Err(TweetgenError::Config(
                self.unavailable_reason(provider).unwrap_or_default(),
            )),
        }
    }

    /// One generation: render the prompt, call the provider, return the text.
    pub async fn generate(&self, provider: Provider, request: &TweetRequest) -> Result<Generation> {
        let client = self.client(provider)?;
        let prompt = self.template.render(request)?;
        tracing::info!(
            %provider,
            model = client.model_name(),
            number = request.number.get(),
            language = %request.language,
            "llm.generate_tweets"
        );
        let response = client.send_prompt(&prompt).await?;

        Ok(Generation {
            text: response.text,
            provider,
            model: response
                .model
                .unwrap_or_else(|| client.model_name().to_string()),
            prompt,
            tokens_used: response.tokens_used,
        })
    }
}
