use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::default::Default;

use crate::errors::ConfigError;
use crate::host::MetadataField;
use crate::language_utils;
use crate::tasks::TaskKind;

/// Application configuration module
/// This module handles the configuration of every curation task: loading
/// defaults, accepting list values as arrays or comma-separated strings, and
/// validating field paths and language tags before any object is touched.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language assumed for items that do not declare one
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Prefix prepended to handles to form canonical URIs
    #[serde(default = "default_handle_canonical_prefix")]
    pub handle_canonical_prefix: String,

    /// Field translator settings
    #[serde(default)]
    pub translator: TranslatorConfig,

    /// EXIF extractor settings
    #[serde(default)]
    pub exif: ExifConfig,

    /// Policy checker settings
    #[serde(default)]
    pub policy_checker: PolicyCheckerConfig,

    /// URI generator settings
    #[serde(default)]
    pub uri_generator: UriGeneratorConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    // @provider: Google Translate v2
    #[default]
    Google,
    // @provider: Microsoft Translator v3
    Microsoft,
}

impl ProviderKind {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google",
            Self::Microsoft => "Microsoft",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Google => "google".to_string(),
            Self::Microsoft => "microsoft".to_string(),
        }
    }

    // @returns: Public API endpoint
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Google => "https://www.googleapis.com/language/translate/v2",
            Self::Microsoft => "https://api.cognitive.microsofttranslator.com",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "microsoft" => Ok(Self::Microsoft),
            _ => Err(ConfigError::InvalidProvider(s.to_string())),
        }
    }
}

/// Field translator configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslatorConfig {
    /// Field holding the item's authoritative language
    #[serde(default = "default_language_field")]
    pub language_field: String,

    /// Fields to translate, as dotted paths
    #[serde(default = "default_field_targets", deserialize_with = "deserialize_list")]
    pub field_targets: Vec<String>,

    /// Languages to translate into
    #[serde(default = "default_language_targets", deserialize_with = "deserialize_list")]
    pub language_targets: Vec<String>,

    /// Translation provider to use
    #[serde(default)]
    pub provider: ProviderKind,

    /// API key for the provider
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service URL, empty for the provider's public endpoint
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// Azure resource region (Microsoft only)
    #[serde(default)]
    pub region: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            language_field: default_language_field(),
            field_targets: default_field_targets(),
            language_targets: default_language_targets(),
            provider: ProviderKind::default(),
            api_key: String::new(),
            endpoint: String::new(),
            region: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TranslatorConfig {
    /// Endpoint to call, falling back to the provider's public one
    pub fn get_endpoint(&self) -> String {
        if self.endpoint.trim().is_empty() {
            self.provider.default_endpoint().to_string()
        } else {
            self.endpoint.trim().to_string()
        }
    }

    pub fn language_field(&self) -> Result<MetadataField, ConfigError> {
        MetadataField::parse(&self.language_field)
    }

    pub fn fields(&self) -> Result<Vec<MetadataField>, ConfigError> {
        if self.field_targets.is_empty() {
            return Err(ConfigError::Missing("translator.field_targets".to_string()));
        }
        self.field_targets.iter().map(|f| MetadataField::parse(f)).collect()
    }

    pub fn languages(&self) -> Result<Vec<String>, ConfigError> {
        if self.language_targets.is_empty() {
            return Err(ConfigError::Missing("translator.language_targets".to_string()));
        }
        self.language_targets
            .iter()
            .map(|lang| validate_language(lang).map(|_| lang.trim().to_string()))
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.language_field()?;
        self.fields()?;
        self.languages()?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Missing("translator.timeout_secs".to_string()));
        }
        Ok(())
    }
}

/// EXIF extractor configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExifConfig {
    /// Tag name (lowercase, words joined by `_`) to target field path
    #[serde(default = "default_exif_tags")]
    pub tags: BTreeMap<String, String>,

    /// Remove existing values of a target field before writing
    #[serde(default)]
    pub clear_existing_metadata: bool,
}

impl Default for ExifConfig {
    fn default() -> Self {
        Self {
            tags: default_exif_tags(),
            clear_existing_metadata: false,
        }
    }
}

impl ExifConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for field in self.tags.values() {
            MetadataField::parse(field)?;
        }
        Ok(())
    }
}

/// Policy checker configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PolicyCheckerConfig {
    /// Bundles whose bitstreams are checked
    #[serde(default = "default_policy_bundles", deserialize_with = "deserialize_list")]
    pub bundles: Vec<String>,
}

impl Default for PolicyCheckerConfig {
    fn default() -> Self {
        Self {
            bundles: default_policy_bundles(),
        }
    }
}

impl PolicyCheckerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bundles.iter().all(|b| b.trim().is_empty()) {
            return Err(ConfigError::Missing("policy_checker.bundles".to_string()));
        }
        Ok(())
    }
}

/// URI generator configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UriGeneratorConfig {
    /// Field that receives the canonical URI
    #[serde(default = "default_uri_field")]
    pub field: String,
}

impl Default for UriGeneratorConfig {
    fn default() -> Self {
        Self {
            field: default_uri_field(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// Split a comma-separated list, trimming entries and dropping empty ones
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn deserialize_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrCsv {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match ListOrCsv::deserialize(deserializer)? {
        ListOrCsv::List(items) => items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        ListOrCsv::Csv(value) => split_list(&value),
    })
}

fn validate_language(tag: &str) -> Result<(), ConfigError> {
    language_utils::validate_language_tag(tag)
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidLanguage(tag.to_string()))
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_handle_canonical_prefix() -> String {
    "http://hdl.handle.net/".to_string()
}

fn default_language_field() -> String {
    "dc.language".to_string()
}

fn default_field_targets() -> Vec<String> {
    vec!["dc.title".to_string(), "dc.description.abstract".to_string()]
}

fn default_language_targets() -> Vec<String> {
    vec!["de".to_string(), "fr".to_string()]
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_exif_tags() -> BTreeMap<String, String> {
    // Documented example mapping: both GPS coordinates into dc.coverage.spatial
    BTreeMap::from([
        ("gps_latitude".to_string(), "dc.coverage.spatial".to_string()),
        ("gps_longitude".to_string(), "dc.coverage.spatial".to_string()),
    ])
}

fn default_policy_bundles() -> Vec<String> {
    vec!["ORIGINAL".to_string(), "TEXT".to_string()]
}

fn default_uri_field() -> String {
    "dc.identifier.uri".to_string()
}

impl Config {
    /// Validate the settings shared by every task.
    ///
    /// Task sections are left to `validate_for`, so a broken translator
    /// section does not stop a policy or URI run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_language(&self.default_locale)
    }

    /// Validate the shared settings plus the section `kind` reads.
    ///
    /// Provider credentials are checked when the translator is built, so a
    /// configuration without an API key still serves the other tasks.
    pub fn validate_for(&self, kind: TaskKind) -> Result<(), ConfigError> {
        self.validate()?;

        match kind {
            TaskKind::Translate => self.translator.validate(),
            TaskKind::Exif => self.exif.validate(),
            TaskKind::Policy => self.policy_checker.validate(),
            TaskKind::Uri => {
                if self.handle_canonical_prefix.trim().is_empty() {
                    return Err(ConfigError::Missing("handle_canonical_prefix".to_string()));
                }
                MetadataField::parse(&self.uri_generator.field).map(|_| ())
            }
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            default_locale: default_locale(),
            handle_canonical_prefix: default_handle_canonical_prefix(),
            translator: TranslatorConfig::default(),
            exif: ExifConfig::default(),
            policy_checker: PolicyCheckerConfig::default(),
            uri_generator: UriGeneratorConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
