//! LLM provider factory.
//!
//! This module provides a factory for creating LLM clients based on
//! application configuration. It handles provider resolution and secret
//! injection.

use std::sync::Arc;
use std::time::Duration;

use forge_core::{AppConfig, AppError, AppResult};

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAIClient};
use crate::types::ProviderType;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (for providers that require it)
/// * `timeout` - Optional per-request timeout
///
/// # Errors
/// Returns error if the provider is unknown or a required secret is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Option<Duration>,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    match provider_type {
        ProviderType::Ollama => {
            let mut client = OllamaClient::with_base_url(endpoint.unwrap_or("http://localhost:11434"));
            if let Some(timeout) = timeout {
                client = client.with_timeout(timeout);
            }
            Ok(Arc::new(client))
        }
        ProviderType::OpenAI => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI provider requires API key".to_string())
            })?;
            let mut client = match endpoint {
                Some(endpoint) => OpenAIClient::with_base_url(api_key, endpoint),
                None => OpenAIClient::new(api_key),
            };
            if let Some(timeout) = timeout {
                client = client.with_timeout(timeout);
            }
            Ok(Arc::new(client))
        }
    }
}

/// Create the completion client for the configured provider.
pub fn create_client_from_config(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    let endpoint = config.resolve_endpoint(&config.provider);
    let api_key = config.resolve_api_key(&config.provider);
    let timeout = config.resolve_timeout(&config.provider).map(Duration::from_secs);

    tracing::debug!(
        provider = %config.provider,
        endpoint = ?endpoint,
        "Creating completion client"
    );

    create_client(
        &config.provider,
        endpoint.as_deref(),
        api_key.as_deref(),
        timeout,
    )
}
