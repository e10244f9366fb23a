/*!
 * Core translation service implementation.
 *
 * This module defines the `TextTranslator` seam used by the batcher and the
 * `TranslationService`, which dispatches single-text translations to the
 * configured backend.
 */

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use url::Url;

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::libretranslate::{LibreTranslate, LibreTranslateRequest};
use crate::providers::ollama::{GenerationRequest, Ollama};
use crate::providers::Provider;

/// A backend that translates one string between two language codes
#[async_trait]
pub trait TextTranslator: Send + Sync {
    /// Translate `text`; a single attempt, no retrying
    async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> Result<String, ProviderError>;
}

/// Normalize an endpoint string into a URL with a scheme
fn normalize_endpoint(endpoint: &str) -> Result<String> {
    if endpoint.trim().is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    if url.host_str().is_none() {
        return Err(anyhow!("Invalid host in endpoint: {}", endpoint));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Translation provider implementation variants
enum TranslationProviderImpl {
    /// LibreTranslate machine translation
    LibreTranslate {
        /// Client instance
        client: LibreTranslate,
    },

    /// Ollama LLM service
    Ollama {
        /// Client instance
        client: Ollama,
    },
}

/// Translation service dispatching to the configured backend
pub struct TranslationService {
    /// Provider implementation
    provider: TranslationProviderImpl,

    /// Configuration for the translation service
    pub config: TranslationConfig,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let endpoint = normalize_endpoint(&config.get_endpoint())?;
        let timeout_secs = config.get_timeout_secs();

        let provider = match config.provider {
            ConfigTranslationProvider::LibreTranslate => TranslationProviderImpl::LibreTranslate {
                client: LibreTranslate::new(endpoint, config.get_api_key(), timeout_secs),
            },
            ConfigTranslationProvider::Ollama => TranslationProviderImpl::Ollama {
                client: Ollama::from_url(endpoint, timeout_secs),
            },
        };

        Ok(Self { provider, config })
    }

    /// Test the connection to the translation provider
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        match &self.provider {
            TranslationProviderImpl::LibreTranslate { client } => client.test_connection().await,
            TranslationProviderImpl::Ollama { client } => client.test_connection().await,
        }
    }

    /// Fill the system prompt template with language names
    pub fn system_prompt(&self, source_language: &str, target_language: &str) -> String {
        let name = |code: &str| language_utils::get_language_name(code).unwrap_or_else(|_| code.to_string());
        self.config.common.system_prompt
            .replace("{source_language}", &name(source_language))
            .replace("{target_language}", &name(target_language))
    }
}

#[async_trait]
impl TextTranslator for TranslationService {
    async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> Result<String, ProviderError> {
        match &self.provider {
            TranslationProviderImpl::LibreTranslate { client } => {
                // LibreTranslate expects two-letter codes where they exist
                let code = |c: &str| language_utils::normalize_to_part1_or_part2t(c).unwrap_or_else(|_| c.to_string());
                let request = LibreTranslateRequest::new(text, code(source_language), code(target_language));
                let response = client.complete(request).await?;
                Ok(LibreTranslate::extract_text(&response))
            }
            TranslationProviderImpl::Ollama { client } => {
                let request = GenerationRequest::new(self.config.get_model(), text)
                    .system(self.system_prompt(source_language, target_language))
                    .temperature(self.config.common.temperature);
                let response = client.complete(request).await?;
                Ok(Ollama::extract_text(&response))
            }
        }
    }
}
