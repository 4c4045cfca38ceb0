use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::ProviderError;
use crate::providers::{TranslationProvider, http_client};

const API_VERSION: &str = "3.0";

/// Microsoft Translator client (Translator Text API v3)
#[derive(Debug)]
pub struct Microsoft {
    /// HTTP client for API requests
    client: Client,
    /// Subscription key
    api_key: String,
    /// Service base URL
    endpoint: String,
    /// Resource region, required for regional and multi-service resources
    region: Option<String>,
}

/// One element of the request body array
#[derive(Debug, Serialize)]
pub struct MicrosoftRequestItem {
    #[serde(rename = "Text")]
    pub text: String,
}

/// Result for one input element
#[derive(Debug, Deserialize)]
pub struct MicrosoftResult {
    #[serde(default)]
    pub translations: Vec<MicrosoftTranslation>,
}

#[derive(Debug, Deserialize)]
pub struct MicrosoftTranslation {
    pub text: String,
    #[serde(default)]
    pub to: Option<String>,
}

impl Microsoft {
    /// Create a new Microsoft Translator client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: http_client(timeout_secs),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            region: None,
        }
    }

    /// Set the resource region sent with every request
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn request_url(&self, from: &str, to: &str) -> Result<Url, ProviderError> {
        let base = format!("{}/translate", self.endpoint.trim_end_matches('/'));
        Url::parse_with_params(&base, &[("api-version", API_VERSION), ("from", from), ("to", to)])
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint {}: {}", self.endpoint, e)))
    }

    /// Perform one translate call
    pub async fn complete(&self, from: &str, to: &str, text: &str) -> Result<Vec<MicrosoftResult>, ProviderError> {
        debug!("Performing API call to translate from {} to {}", from, to);

        let url = self.request_url(from, to)?;
        let body = vec![MicrosoftRequestItem { text: text.to_string() }];

        let mut request = self
            .client
            .post(url)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .json(&body);
        if let Some(region) = &self.region {
            request = request.header("Ocp-Apim-Subscription-Region", region);
        }

        let response = request.send().await?;

        let status = response.status();
        debug!("Response code from API call is {}", status.as_u16());
        if status != StatusCode::OK {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Microsoft Translator error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<Vec<MicrosoftResult>>(&body)
            .map_err(|e| ProviderError::ParseError(format!("Error reading Microsoft Translator response: {}", e)))
    }

    /// First candidate of the first result with HTML entities decoded
    pub fn extract_text(results: &[MicrosoftResult]) -> Option<String> {
        results
            .first()
            .and_then(|r| r.translations.first())
            .map(|t| html_escape::decode_html_entities(&t.text).into_owned())
    }
}

#[async_trait]
impl TranslationProvider for Microsoft {
    fn name(&self) -> &str {
        "Microsoft"
    }

    async fn request_translation(&self, from: &str, to: &str, text: &str) -> Result<String, ProviderError> {
        let results = self.complete(from, to, text).await?;
        Self::extract_text(&results).ok_or(ProviderError::EmptyResponse)
    }
}
