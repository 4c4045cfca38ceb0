/*!
 * Error types for the curation tasks.
 *
 * This module contains custom error types for the different collaborators a
 * task talks to, using the thiserror crate for ergonomic error definitions.
 * Only `ConfigError` is fatal; every other kind is logged, folded into the
 * task's result text and status, and processing moves on.
 */

use thiserror::Error;

/// Errors raised while building a task from its configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required setting is absent or empty
    #[error("Missing configuration value: {0}")]
    Missing(String),

    /// A metadata field path that is not `schema.element[.qualifier]`
    #[error("Invalid metadata field '{field}': {reason}")]
    InvalidField {
        /// The offending path as configured
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// A language tag whose primary subtag is not an ISO 639 code
    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),

    /// An unknown translation provider name
    #[error("Invalid provider type: {0}")]
    InvalidProvider(String),

    /// The selected provider needs an API key and none was configured
    #[error("Translation API key is required for {0} provider")]
    MissingApiKey(String),
}

/// Errors that can occur when working with translation provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The response parsed but carried no translation candidate
    #[error("No translation in response")]
    EmptyResponse,
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors reported by the host repository
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    /// Writing or committing metadata failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Bitstream content could not be retrieved
    #[error("Storage error: {0}")]
    Storage(String),

    /// Authorization policies could not be read
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// A database context could not be obtained or released
    #[error("Context error: {0}")]
    Context(String),
}

/// Errors while reading EXIF data from a bitstream
#[derive(Error, Debug)]
pub enum ExifError {
    /// The bitstream bytes could not be fetched
    #[error("Could not retrieve bitstream: {0}")]
    Retrieve(#[from] HostError),

    /// The image metadata is malformed or absent
    #[error("Could not decode EXIF data: {0}")]
    Decode(#[from] exif::Error),
}
