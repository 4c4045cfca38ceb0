use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::errors::ProviderError;
use crate::providers::{TranslationProvider, http_client};

/// Google Translate client (API v2, "simple API access" keys)
#[derive(Debug)]
pub struct Google {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Translate v2 endpoint URL
    endpoint: String,
}

/// Translate v2 response body
#[derive(Debug, Deserialize)]
pub struct GoogleResponse {
    pub data: GoogleData,
}

#[derive(Debug, Deserialize)]
pub struct GoogleData {
    #[serde(default)]
    pub translations: Vec<GoogleTranslation>,
}

/// One translation candidate
#[derive(Debug, Deserialize)]
pub struct GoogleTranslation {
    /// Translated text, HTML-escaped by the API
    #[serde(rename = "translatedText")]
    pub translated_text: String,

    /// Present when no source language was given
    #[serde(rename = "detectedSourceLanguage", default)]
    pub detected_source_language: Option<String>,
}

impl Google {
    /// Create a new Google client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: http_client(timeout_secs),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Request URL with every parameter form-encoded
    pub fn request_url(&self, from: &str, to: &str, text: &str) -> Result<Url, ProviderError> {
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("key", self.api_key.as_str()),
                ("source", from),
                ("target", to),
                ("q", text),
            ],
        )
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint {}: {}", self.endpoint, e)))
    }

    /// Perform one translate call
    pub async fn complete(&self, from: &str, to: &str, text: &str) -> Result<GoogleResponse, ProviderError> {
        debug!("Performing API call to translate from {} to {}", from, to);

        let url = self.request_url(from, to, text)?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        debug!("Response code from API call is {}", status.as_u16());
        if status != StatusCode::OK {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Google API error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<GoogleResponse>(&body)
            .map_err(|e| ProviderError::ParseError(format!("Error reading Google API response: {}", e)))
    }

    /// First candidate with HTML entities decoded
    pub fn extract_text(response: &GoogleResponse) -> Option<String> {
        response
            .data
            .translations
            .first()
            .map(|t| html_escape::decode_html_entities(&t.translated_text).into_owned())
    }
}

#[async_trait]
impl TranslationProvider for Google {
    fn name(&self) -> &str {
        "Google"
    }

    async fn request_translation(&self, from: &str, to: &str, text: &str) -> Result<String, ProviderError> {
        let response = self.complete(from, to, text).await?;
        Self::extract_text(&response).ok_or(ProviderError::EmptyResponse)
    }
}
