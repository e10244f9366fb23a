/*!
 * LibreTranslate API client.
 *
 * `POST {endpoint}/translate` with a JSON body of `q`, `source`, `target`,
 * `format` and an optional `api_key`; the answer carries `translatedText`.
 */

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{status_error, transport_error, Provider};

/// LibreTranslate client
#[derive(Debug)]
pub struct LibreTranslate {
    /// Base URL without trailing slash
    base_url: String,
    /// API key, sent only when non-empty
    api_key: String,
    /// HTTP client for making requests
    client: Client,
}

/// Translation request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibreTranslateRequest {
    /// Text to translate
    pub q: String,
    /// Source language code (ISO 639-1)
    pub source: String,
    /// Target language code (ISO 639-1)
    pub target: String,
    /// Input format, always "text" here
    pub format: String,
    /// API key for hosted instances
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl LibreTranslateRequest {
    pub fn new(text: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            q: text.into(),
            source: source.into(),
            target: target.into(),
            format: "text".to_string(),
            api_key: None,
        }
    }
}

/// Translation response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibreTranslateResponse {
    #[serde(rename = "translatedText")]
    pub translated_text: String,
}

/// Error body returned with non-success statuses
#[derive(Debug, Deserialize)]
struct LibreTranslateErrorBody {
    error: String,
}

impl LibreTranslate {
    /// Create a new client for the given endpoint
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout_secs: u64) -> Self {
        let endpoint = endpoint.into();
        Self {
            base_url: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Pull the `error` field out of an error body, or return the body as is
    fn error_message(body: String) -> String {
        serde_json::from_str::<LibreTranslateErrorBody>(&body)
            .map(|parsed| parsed.error)
            .unwrap_or(body)
    }
}

#[async_trait]
impl Provider for LibreTranslate {
    type Request = LibreTranslateRequest;
    type Response = LibreTranslateResponse;

    async fn complete(&self, mut request: Self::Request) -> Result<Self::Response, ProviderError> {
        if request.api_key.is_none() && !self.api_key.is_empty() {
            request.api_key = Some(self.api_key.clone());
        }

        let url = format!("{}/translate", self.base_url);
        let response = self.client.post(&url)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            return Err(status_error(status, Self::error_message(body)));
        }

        let body = response.text().await.map_err(transport_error)?;
        serde_json::from_str::<LibreTranslateResponse>(&body)
            .map_err(|e| ProviderError::ParseError(format!("{}: {}", e, body.chars().take(200).collect::<String>())))
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/languages", self.base_url);
        let response = self.client.get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(status_error(status, Self::error_message(body)))
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response.translated_text.clone()
    }
}
