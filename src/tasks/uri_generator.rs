/*!
 * Handle-URI regenerator.
 *
 * Replaces the identifier field of an item with its canonical handle URI.
 */

use async_trait::async_trait;
use log::{debug, error, info};

use crate::app_config::Config;
use crate::curation::{CurationStatus, CurationTask, Curator};
use crate::errors::{ConfigError, HostError};
use crate::host::{DSpaceObject, Item, LanguageFilter, MetadataField};

pub const TASK_ID: &str = "uri";

pub struct UriGenerator {
    prefix: String,
    field: MetadataField,
}

impl UriGenerator {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let prefix = config.handle_canonical_prefix.trim().to_string();
        if prefix.is_empty() {
            return Err(ConfigError::Missing("handle_canonical_prefix".to_string()));
        }

        Ok(Self {
            prefix,
            field: MetadataField::parse(&config.uri_generator.field)?,
        })
    }

    pub fn field(&self) -> &MetadataField {
        &self.field
    }

    pub fn canonical_uri(&self, handle: &str) -> String {
        format!("{}{}", self.prefix, handle)
    }

    /// Write the canonical URI as the only value of the field.
    ///
    /// If the item cannot be persisted its metadata is put back exactly as it
    /// was, order included.
    pub fn regenerate(&self, item: &mut dyn Item) -> Result<String, HostError> {
        let uri = self.canonical_uri(item.handle());
        let snapshot = item.metadata();
        let replaced = item.get_metadata(&self.field, LanguageFilter::Any).len();

        item.clear_metadata(&self.field, LanguageFilter::Any);
        item.add_metadata(&self.field, None, &uri);

        if let Err(e) = item.update() {
            item.set_metadata(snapshot);
            return Err(e);
        }

        debug!("Replaced {} value(s) of {} on {}", replaced, self.field, item.handle());
        Ok(uri)
    }
}

#[async_trait]
impl CurationTask for UriGenerator {
    fn task_id(&self) -> &str {
        TASK_ID
    }

    async fn perform(&mut self, object: DSpaceObject<'_>, curator: &dyn Curator) -> CurationStatus {
        let (status, text) = match object {
            DSpaceObject::Item(item) => match self.regenerate(item) {
                Ok(uri) => {
                    info!("Generated URI for {}: {}", item.handle(), uri);
                    (CurationStatus::Success, format!("Generated URI for {}: {}", item.handle(), uri))
                }
                Err(e) => {
                    error!("Failed to generate URI for {}: {}", item.handle(), e);
                    (CurationStatus::Error, format!("Failed to generate URI for {}: {}", item.handle(), e))
                }
            },
            other => {
                debug!("Not generating a URI for {} {}", other.type_name(), other.handle());
                return CurationStatus::Unset;
            }
        };

        curator.set_result(TASK_ID, &text);
        curator.report(&text);
        status
    }
}
