/*!
 * The curation tasks.
 *
 * - `translator`: fills missing language variants through a translation provider
 * - `exif_extractor`: copies EXIF tags of JPEG bitstreams into metadata
 * - `policy_checker`: reports bitstreams readable by the anonymous group
 * - `uri_generator`: rewrites the canonical handle URI
 */

use std::fmt;
use std::sync::Arc;

use crate::app_config::Config;
use crate::curation::{CurationTask, Curator};
use crate::errors::ConfigError;
use crate::host::{AuthorizeService, BitstreamStore, ContextFactory};

pub mod exif_extractor;
pub mod policy_checker;
pub mod translator;
pub mod uri_generator;

pub use exif_extractor::ExifExtractor;
pub use policy_checker::PolicyChecker;
pub use translator::FieldTranslator;
pub use uri_generator::UriGenerator;

/// Which task to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Translate,
    Exif,
    Policy,
    Uri,
}

impl TaskKind {
    pub fn task_id(&self) -> &'static str {
        match self {
            Self::Translate => translator::TASK_ID,
            Self::Exif => exif_extractor::TASK_ID,
            Self::Policy => policy_checker::TASK_ID,
            Self::Uri => uri_generator::TASK_ID,
        }
    }

    /// Whether the task writes item metadata
    pub fn modifies_items(&self) -> bool {
        !matches!(self, Self::Policy)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.task_id())
    }
}

/// Host collaborators handed to the tasks that need them
#[derive(Clone)]
pub struct HostServices {
    pub store: Arc<dyn BitstreamStore>,
    pub authorize: Arc<dyn AuthorizeService>,
    pub contexts: Arc<dyn ContextFactory>,
}

impl HostServices {
    /// Services all backed by one repository
    pub fn from_repository<R>(repository: Arc<R>) -> Self
    where
        R: BitstreamStore + AuthorizeService + ContextFactory + 'static,
    {
        Self {
            store: repository.clone(),
            authorize: repository.clone(),
            contexts: repository,
        }
    }
}

/// Build a task from the configuration. Construction reports go to `curator`.
pub fn create_task(
    kind: TaskKind,
    config: &Config,
    services: &HostServices,
    curator: &dyn Curator,
) -> Result<Box<dyn CurationTask>, ConfigError> {
    let task: Box<dyn CurationTask> = match kind {
        TaskKind::Translate => Box::new(FieldTranslator::new(config)?),
        TaskKind::Exif => Box::new(ExifExtractor::new(
            &config.exif,
            services.store.clone(),
            services.contexts.clone(),
            curator,
        )?),
        TaskKind::Policy => Box::new(PolicyChecker::new(
            &config.policy_checker,
            services.authorize.clone(),
            services.contexts.clone(),
            curator,
        )?),
        TaskKind::Uri => Box::new(UriGenerator::new(config)?),
    };
    Ok(task)
}
