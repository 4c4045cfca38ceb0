/*!
 * EXIF metadata copier.
 *
 * Reads the EXIF block of every JPEG in an item's ORIGINAL bundle and copies
 * the values of configured tags into metadata fields.
 */

use async_trait::async_trait;
use log::{debug, error, info};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;

use crate::app_config::ExifConfig;
use crate::curation::{CurationStatus, CurationTask, Curator};
use crate::errors::{ConfigError, ExifError};
use crate::host::{
    Bitstream, BitstreamStore, ContextFactory, ContextGuard, DSpaceObject, Item, LanguageFilter, MetadataField,
};

pub const TASK_ID: &str = "exif";

const SOURCE_BUNDLE: &str = "ORIGINAL";

/// Normalize an EXIF tag name for lookup in the tag mapping.
///
/// `GPS Latitude`, `GPSLatitude` and `gps_latitude` all become `gps_latitude`.
pub fn normalize_tag_name(name: &str) -> String {
    let name = name.trim();

    if name.contains(|c: char| c.is_whitespace() || c == '_') {
        return name
            .split(|c: char| c.is_whitespace() || c == '_')
            .filter(|part| !part.is_empty())
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("_");
    }

    let chars: Vec<char> = name.chars().collect();
    let mut normalized = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                normalized.push('_');
            }
        }
        normalized.extend(c.to_lowercase());
    }
    normalized
}

/// Normalized tag name to target field, fixed at construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMapping {
    entries: BTreeMap<String, MetadataField>,
}

impl TagMapping {
    pub fn from_config(config: &ExifConfig) -> Result<Self, ConfigError> {
        let mut entries = BTreeMap::new();
        for (tag, field) in &config.tags {
            let name = normalize_tag_name(tag);
            if name.is_empty() {
                return Err(ConfigError::Missing("exif tag name".to_string()));
            }
            entries.insert(name, MetadataField::parse(field)?);
        }
        Ok(Self { entries })
    }

    pub fn get(&self, tag: &str) -> Option<&MetadataField> {
        self.entries.get(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataField)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decode the primary-image EXIF tags of an image as (normalized name, value).
/// An image without an EXIF block has no tags.
pub fn read_tags(bytes: &[u8]) -> Result<Vec<(String, String)>, ExifError> {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let tags = exif
        .fields()
        .filter(|field| field.ifd_num == exif::In::PRIMARY)
        .map(|field| {
            let value = match &field.value {
                exif::Value::Ascii(parts) => parts
                    .iter()
                    .map(|part| String::from_utf8_lossy(part).trim().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => field.display_value().with_unit(&exif).to_string(),
            };
            (normalize_tag_name(&field.tag.to_string()), value)
        })
        .collect();

    Ok(tags)
}

/// Copies configured EXIF tags into item metadata
pub struct ExifExtractor {
    mapping: TagMapping,
    clear_existing: bool,
    store: Arc<dyn BitstreamStore>,
    contexts: Arc<dyn ContextFactory>,
}

impl ExifExtractor {
    /// Build the task and report every mapping it will apply
    pub fn new(
        config: &ExifConfig,
        store: Arc<dyn BitstreamStore>,
        contexts: Arc<dyn ContextFactory>,
        curator: &dyn Curator,
    ) -> Result<Self, ConfigError> {
        let mapping = TagMapping::from_config(config)?;
        for (tag, field) in mapping.iter() {
            curator.report(&format!("Looking for {} to copy to {}", tag, field));
        }

        Ok(Self {
            mapping,
            clear_existing: config.clear_existing_metadata,
            store,
            contexts,
        })
    }

    pub fn mapping(&self) -> &TagMapping {
        &self.mapping
    }

    fn extract(&self, guard: &ContextGuard, bitstream: &Bitstream) -> Result<Vec<(String, String)>, ExifError> {
        let bytes = self.store.retrieve(guard.context(), bitstream)?;
        debug!("Read {} bytes from {}", bytes.len(), bitstream.name);
        read_tags(&bytes)
    }

    /// Write one tag value; false when the item could not be persisted
    fn copy_value(
        &self,
        item: &mut dyn Item,
        guard: &mut ContextGuard,
        field: &MetadataField,
        value: &str,
        curator: &dyn Curator,
    ) -> bool {
        let handle = item.handle().to_string();

        if self.clear_existing {
            item.clear_metadata(field, LanguageFilter::Any);
        }
        item.add_metadata(field, None, value);

        if let Err(e) = item.update().and_then(|_| guard.commit()) {
            error!("Could not store {} on {}: {}", field, handle, e);
            curator.report(&format!("{}: An error occurred updating {}: {}", handle, field, value));
            return false;
        }

        curator.report(&format!("{} added {} = {}", handle, field, value));
        true
    }

    fn copy_tags(&self, item: &mut dyn Item, curator: &dyn Curator) -> CurationStatus {
        let handle = item.handle().to_string();

        let mut guard = match ContextGuard::open(self.contexts.as_ref()) {
            Ok(guard) => guard,
            Err(e) => {
                error!("No context for {}: {}", handle, e);
                curator.report(&format!("{}: Error extracting EXIF: {}", handle, e));
                return CurationStatus::Error;
            }
        };

        let mut status = CurationStatus::Success;
        let mut copied = 0usize;

        let jpegs = item
            .bundles(SOURCE_BUNDLE)
            .into_iter()
            .flat_map(|bundle| bundle.bitstreams)
            .filter(Bitstream::is_jpeg);

        for bitstream in jpegs {
            let tags = match self.extract(&guard, &bitstream) {
                Ok(tags) => tags,
                Err(e) => {
                    info!("Skipping {} on {}: {}", bitstream.name, handle, e);
                    curator.report(&format!("{}: Error extracting EXIF: {}", handle, e));
                    continue;
                }
            };

            for (tag, value) in tags {
                let Some(field) = self.mapping.get(&tag) else {
                    continue;
                };
                if self.copy_value(item, &mut guard, field, &value, curator) {
                    copied += 1;
                } else {
                    status = CurationStatus::Error;
                }
            }
        }

        if let Err(e) = item.update() {
            error!("Final update of {} failed: {}", handle, e);
            curator.report(&format!("{}: An error occurred updating item metadata", handle));
            status = CurationStatus::Error;
        }

        if let Err(e) = guard.complete() {
            error!("Could not complete context for {}: {}", handle, e);
        }

        info!("Copied {} EXIF value(s) to {} ({})", copied, handle, status);
        curator.set_result(TASK_ID, &format!("Copied {} EXIF value(s) to {}", copied, handle));
        status
    }
}

#[async_trait]
impl CurationTask for ExifExtractor {
    fn task_id(&self) -> &str {
        TASK_ID
    }

    async fn perform(&mut self, object: DSpaceObject<'_>, curator: &dyn Curator) -> CurationStatus {
        match object {
            DSpaceObject::Item(item) => self.copy_tags(item, curator),
            other => {
                debug!("Skipping {} {}", other.type_name(), other.handle());
                CurationStatus::Skip
            }
        }
    }
}
