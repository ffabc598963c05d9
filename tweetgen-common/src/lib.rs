//! Common types and utilities shared across tweetgen crates.
//!
//! This crate defines the request data model, the prompt template, the
//! provider-agnostic [`LlmConfig`], observability helpers, and the shared
//! error type used throughout the workspace. It is intentionally lightweight
//! so that every crate can depend on it.
//!
//! # Overview
//!
//! - [`TweetRequest`]: the three form fields (topic, count, language)
//! - [`template::PromptTemplate`]: placeholder substitution for prompts
//! - [`LlmConfig`]: resolved settings for one model provider
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`TweetgenError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use tweetgen_common::{template::PromptTemplate, Language, Topic, TweetCount, TweetRequest};
//!
//! let request = TweetRequest::new(
//!     Topic::new("rust").unwrap(),
//!     TweetCount::new(3).unwrap(),
//!     Language::French,
//! );
//! let prompt = PromptTemplate::tweets().render(&request).unwrap();
//! assert_eq!(prompt, "Give me 3 tweets on rust in French");
//! ```
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod model;
pub mod observability;
pub mod template;

pub use model::{Generation, Language, Provider, Topic, TweetCount, TweetRequest};

/// Resolved configuration for one LLM provider.
///
/// Built by `tweetgen-config` once an API key has been found; consumed by
/// `tweetgen_llm::ensure_llm_ready`.
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    /// Base URL of the provider API, e.g. `https://api.openai.com/v1`.
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
    pub retries: usize,
}

impl LlmConfig {
    /// Settings with the provider's default model and endpoint.
    pub fn for_provider(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: provider.default_model().to_string(),
            endpoint: provider.default_endpoint().to_string(),
            temperature: None,
            max_tokens: None,
            timeout_secs: 60,
            retries: 0,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Keys never reach logs through `{:?}`.
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("retries", &self.retries)
            .finish()
    }
}

/// Error types used across the tweetgen system.
#[derive(thiserror::Error, Debug)]
pub enum TweetgenError {
    /// A model provider failed to complete a request.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Configuration was incomplete or invalid (including missing API keys).
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input did not satisfy the request constraints.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// An unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),

    /// Operation exceeded the configured timeout.
    #[error("Timeout occurred")]
    Timeout,
}

/// Convenient alias for results that use [`TweetgenError`].
pub type Result<T> = std::result::Result<T, TweetgenError>;
