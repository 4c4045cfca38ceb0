/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for machine translation APIs:
 * - Google: Google Translate API v2
 * - Microsoft: Microsoft Translator Text API v3
 * - Mock: deterministic stand-in for tests
 */

use async_trait::async_trait;
use log::warn;
use std::fmt::Debug;
use std::time::Duration;

use crate::app_config::{ProviderKind, TranslatorConfig};
use crate::errors::{ConfigError, ProviderError};

/// Common trait for all translation providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the field translator.
#[async_trait]
pub trait TranslationProvider: Send + Sync + Debug {
    /// Provider name for log lines
    fn name(&self) -> &str;

    /// Issue one translation request
    ///
    /// # Arguments
    /// * `from` - Source language tag
    /// * `to` - Target language tag
    /// * `text` - Text to translate
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The first translation candidate or an error
    async fn request_translation(&self, from: &str, to: &str, text: &str) -> Result<String, ProviderError>;

    /// Translate text, folding every failure into `None`
    ///
    /// Non-success responses, unreadable payloads and empty candidates all
    /// mean "no translation produced"; the reason is logged here.
    async fn translate(&self, from: &str, to: &str, text: &str) -> Option<String> {
        match self.request_translation(from, to, text).await {
            Ok(translated) if !translated.trim().is_empty() => Some(translated),
            Ok(_) => {
                warn!("{} returned an empty translation ({} -> {})", self.name(), from, to);
                None
            }
            Err(e) => {
                warn!("{} translation failed ({} -> {}): {}", self.name(), from, to, e);
                None
            }
        }
    }
}

/// HTTP client with the configured request timeout
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_default()
}

/// Build the provider selected in the configuration
pub fn create_provider(config: &TranslatorConfig) -> Result<Box<dyn TranslationProvider>, ConfigError> {
    if config.api_key.trim().is_empty() {
        return Err(ConfigError::MissingApiKey(config.provider.display_name().to_string()));
    }

    let provider: Box<dyn TranslationProvider> = match config.provider {
        ProviderKind::Google => Box::new(google::Google::new(
            config.api_key.trim(),
            config.get_endpoint(),
            config.timeout_secs,
        )),
        ProviderKind::Microsoft => {
            let mut client = microsoft::Microsoft::new(
                config.api_key.trim(),
                config.get_endpoint(),
                config.timeout_secs,
            );
            if let Some(region) = config.region.as_deref().filter(|r| !r.trim().is_empty()) {
                client = client.with_region(region.trim());
            }
            Box::new(client)
        }
    };

    Ok(provider)
}

pub mod google;
pub mod microsoft;
pub mod mock;
