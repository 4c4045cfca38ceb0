/*!
 * Content model exposed by the host repository.
 *
 * Items carry qualified Dublin Core style metadata and bitstreams grouped in
 * named bundles. The host owns these objects; tasks read them and append or
 * clear metadata values through the `Item` trait.
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{ConfigError, HostError};

/// A metadata field path: `schema.element[.qualifier]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataField {
    pub schema: String,
    pub element: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
}

impl MetadataField {
    pub fn new(schema: impl Into<String>, element: impl Into<String>, qualifier: Option<&str>) -> Self {
        Self {
            schema: schema.into(),
            element: element.into(),
            qualifier: qualifier.map(str::to_string),
        }
    }

    /// Parse a dotted field path. Segments past the qualifier are ignored.
    pub fn parse(path: &str) -> Result<Self, ConfigError> {
        let path = path.trim();
        let segments: Vec<&str> = path.split('.').map(str::trim).collect();

        if segments.len() < 2 {
            return Err(ConfigError::InvalidField {
                field: path.to_string(),
                reason: "expected schema.element[.qualifier]".to_string(),
            });
        }
        if segments.iter().take(3).any(|s| s.is_empty()) {
            return Err(ConfigError::InvalidField {
                field: path.to_string(),
                reason: "empty segment".to_string(),
            });
        }

        Ok(Self::new(segments[0], segments[1], segments.get(2).copied()))
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}.{}.{}", self.schema, self.element, q),
            None => write!(f, "{}.{}", self.schema, self.element),
        }
    }
}

impl FromStr for MetadataField {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Which language tags a metadata lookup or clear applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageFilter<'a> {
    /// Every value regardless of its language
    Any,
    /// Only values that carry no language tag
    Unset,
    /// Only values tagged with exactly this language
    Is(&'a str),
}

impl LanguageFilter<'_> {
    pub fn matches(&self, language: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Unset => language.is_none(),
            Self::Is(tag) => language == Some(*tag),
        }
    }
}

/// One metadata value on an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataValue {
    #[serde(flatten)]
    pub field: MetadataField,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub value: String,
}

impl MetadataValue {
    pub fn new(field: MetadataField, language: Option<&str>, value: impl Into<String>) -> Self {
        Self {
            field,
            language: language.map(str::to_string),
            value: value.into(),
        }
    }
}

/// A stored file attached to an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bitstream {
    pub id: u64,
    pub name: String,
    /// Short format description as registered by the host, e.g. "JPEG"
    pub format_description: String,
}

impl Bitstream {
    pub fn is_jpeg(&self) -> bool {
        self.format_description.eq_ignore_ascii_case("JPEG")
    }
}

/// A named group of bitstreams (ORIGINAL, TEXT, THUMBNAIL, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub name: String,
    #[serde(default)]
    pub bitstreams: Vec<Bitstream>,
}

/// Metadata and bitstream access to a repository item.
///
/// Implemented by the host. Appends and clears are buffered on the item until
/// `update` persists them.
pub trait Item: Send + Sync {
    /// Persistent identifier, e.g. "123456789/42"
    fn handle(&self) -> &str;

    /// Values of `field` whose language passes `language`, in stored order
    fn get_metadata(&self, field: &MetadataField, language: LanguageFilter<'_>) -> Vec<MetadataValue>;

    /// Append a value to `field`
    fn add_metadata(&mut self, field: &MetadataField, language: Option<&str>, value: &str);

    /// Remove every value of `field` whose language passes `language`
    fn clear_metadata(&mut self, field: &MetadataField, language: LanguageFilter<'_>);

    /// Every value of the item, in stored order
    fn metadata(&self) -> Vec<MetadataValue>;

    /// Replace all of the item's values, keeping the given order
    fn set_metadata(&mut self, values: Vec<MetadataValue>);

    /// Bundles with the given name (the host allows duplicates)
    fn bundles(&self, name: &str) -> Vec<Bundle>;

    /// Persist pending metadata changes
    fn update(&mut self) -> Result<(), HostError>;
}

/// The object handed to a task by the curation engine
pub enum DSpaceObject<'a> {
    Item(&'a mut dyn Item),
    Collection { handle: &'a str },
    Community { handle: &'a str },
}

impl DSpaceObject<'_> {
    pub fn handle(&self) -> &str {
        match self {
            Self::Item(item) => item.handle(),
            Self::Collection { handle } | Self::Community { handle } => *handle,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Item(_) => "item",
            Self::Collection { .. } => "collection",
            Self::Community { .. } => "community",
        }
    }
}
