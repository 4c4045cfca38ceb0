/*!
 * Field translator.
 *
 * Fills in missing language variants of configured metadata fields by
 * translating the item's authoritative-language values through a
 * `TranslationProvider`. Success or failure is tracked per field: a value
 * that cannot be translated or saved is reported and the run carries on.
 */

use async_trait::async_trait;
use log::{debug, error, info};

use crate::app_config::Config;
use crate::curation::{CurationStatus, CurationTask, Curator, ResultLog};
use crate::errors::ConfigError;
use crate::host::{DSpaceObject, Item, LanguageFilter, MetadataField};
use crate::language_utils;
use crate::providers::{self, TranslationProvider};

pub const TASK_ID: &str = "translate";

const REPORT_HEADER: &str = "Translation report: \n----------------\n";

/// Translates metadata fields into every configured target language
pub struct FieldTranslator {
    provider: Box<dyn TranslationProvider>,
    language_field: MetadataField,
    default_language: String,
    languages: Vec<String>,
    fields: Vec<MetadataField>,
}

impl FieldTranslator {
    /// Build the translator with the provider selected in `config`
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let provider = providers::create_provider(&config.translator)?;
        Self::with_provider(config, provider)
    }

    /// Build the translator around an already constructed provider
    pub fn with_provider(config: &Config, provider: Box<dyn TranslationProvider>) -> Result<Self, ConfigError> {
        let translator = &config.translator;
        let default_language = config.default_locale.trim().to_string();
        if default_language.is_empty() {
            return Err(ConfigError::Missing("default_locale".to_string()));
        }

        Ok(Self {
            provider,
            language_field: translator.language_field()?,
            default_language,
            languages: translator.languages()?,
            fields: translator.fields()?,
        })
    }

    pub fn provider(&self) -> &dyn TranslationProvider {
        self.provider.as_ref()
    }

    /// The item's declared language, or the configured default.
    /// Only the first declared value counts.
    pub fn authoritative_language(&self, item: &dyn Item) -> String {
        item.get_metadata(&self.language_field, LanguageFilter::Any)
            .into_iter()
            .next()
            .map(|v| v.value.trim().to_string())
            .filter(|lang| !lang.is_empty())
            .unwrap_or_else(|| self.default_language.clone())
    }

    /// Translate every (language, field) pair on one item
    pub async fn translate_item(&self, item: &mut dyn Item) -> (CurationStatus, ResultLog) {
        let mut status = CurationStatus::Success;
        let mut log = ResultLog::new();

        let handle = item.handle().to_string();
        debug!("Translating metadata for {}", handle);

        let auth_lang = self.authoritative_language(item);
        debug!(
            "Authoritative language for {} is {} ({})",
            handle,
            auth_lang,
            language_utils::display_name(&auth_lang)
        );

        for lang in &self.languages {
            for field in &self.fields {
                if !item.get_metadata(field, LanguageFilter::Is(lang)).is_empty() {
                    debug!("{} already has {} in {}, skipping", handle, field, lang);
                    log.push(format!("{}: Skipping {} translation ({})", handle, lang, field));
                    continue;
                }

                let sources = item.get_metadata(field, LanguageFilter::Is(&auth_lang));
                for source in sources {
                    let Some(translated) = self.provider.translate(&auth_lang, lang, &source.value).await else {
                        log.push(format!(
                            "{}: Failed translation of {} -> {} ({})",
                            handle, auth_lang, lang, field
                        ));
                        continue;
                    };

                    item.add_metadata(field, Some(lang), &translated);

                    match item.update() {
                        Ok(()) => {
                            log.push(format!(
                                "{}: Translated {} -> {} ({})",
                                handle, auth_lang, lang, field
                            ));
                        }
                        Err(e) => {
                            error!("Could not save {} translation of {} for {}: {}", lang, field, handle, e);
                            log.push(format!(
                                "{}: Error saving {} -> {} translation ({}): {}",
                                handle, auth_lang, lang, field, e
                            ));
                            status = CurationStatus::Error;
                        }
                    }
                }
            }
        }

        info!(
            "Finished translating {} into {} language(s) with {} ({})",
            handle,
            self.languages.len(),
            self.provider.name(),
            status
        );
        (status, log)
    }
}

#[async_trait]
impl CurationTask for FieldTranslator {
    fn task_id(&self) -> &str {
        TASK_ID
    }

    async fn perform(&mut self, object: DSpaceObject<'_>, curator: &dyn Curator) -> CurationStatus {
        let (status, log) = match object {
            DSpaceObject::Item(item) => self.translate_item(item).await,
            other => {
                debug!("Not translating {} {}", other.type_name(), other.handle());
                (CurationStatus::Unset, ResultLog::new())
            }
        };

        log.flush(curator, TASK_ID, REPORT_HEADER);
        status
    }
}
