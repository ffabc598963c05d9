//! Provider‑agnostic LLM integration for tweetgen.
//!
//! This crate exposes a common [`traits::LlmClient`] interface and concrete
//! provider implementations for Google Gemini and OpenAI. It also provides
//! [`ensure_llm_ready`] to build a client from a [`tweetgen_common::LlmConfig`]
//! and the [`generator::TweetGenerator`] that ties the prompt template to a
//! provider.
//!
//! # Examples
//! ```no_run
//! use tweetgen_common::{LlmConfig, Provider, Result};
//! use tweetgen_llm::ensure_llm_ready;
//!
//! # fn main() -> Result<()> {
//! let cfg = LlmConfig::for_provider(Provider::Gemini, "my-key");
//! let client = ensure_llm_ready(&cfg)?;
//! assert_eq!(client.model_name(), "gemini-1.5-flash-latest");
//! # Ok(())
//! # }
//! ```
pub mod gemini;
pub mod generator;
pub mod openai;
pub mod traits;

use gemini::GeminiClient;
use openai::OpenAiClient;
use std::sync::Arc;
use traits::LlmClient;
use tweetgen_common::{LlmConfig, Provider, TweetgenError};
use tweetgen_http::HttpError;

pub use generator::{ProviderSlot, SharedClient, TweetGenerator};

/// Build the client for the configured provider.
pub fn ensure_llm_ready(
    config: &LlmConfig,
) -> tweetgen_common::Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    tracing::debug!(?config, "llm.client.build");
    if config.api_key.trim().is_empty() {
        return Err(TweetgenError::Config(format!(
            "{} is not set",
            config.provider.api_key_env()
        )));
    }
    match config.provider {
        Provider::Gemini => Ok(Arc::new(GeminiClient::from_config(config)?)),
        Provider::OpenAi => Ok(Arc::new(OpenAiClient::from_config(config)?)),
    }
}

/// Map transport failures to user-facing provider errors.
pub(crate) fn http_to_tweetgen(provider: Provider, e: HttpError) -> TweetgenError {
    match &e {
        HttpError::Timeout(_) => TweetgenError::Timeout,
        HttpError::Api {
            status, message, ..
        } => match status.as_u16() {
            401 => TweetgenError::Provider(format!(
                "Invalid API key for {} ({message})",
                provider.label()
            )),
            403 => TweetgenError::Provider(format!(
                "{} API access forbidden ({message})",
                provider.label()
            )),
            429 => TweetgenError::Provider(format!(
                "{} rate limit exceeded ({message})",
                provider.label()
            )),
            _ => TweetgenError::Provider(format!(
                "{} API error ({status}): {message}",
                provider.label()
            )),
        },
        _ => TweetgenError::Provider(format!("{} request failed: {e}", provider.label())),
    }
}
