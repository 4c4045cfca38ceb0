/*!
 * Anonymous-read policy reporter.
 *
 * Lists the bitstreams of an item that anyone can download, one CSV line
 * per anonymous READ policy. Nothing is modified.
 */

use async_trait::async_trait;
use log::{debug, error, info};
use std::sync::Arc;

use crate::app_config::PolicyCheckerConfig;
use crate::curation::{CurationStatus, CurationTask, Curator, ResultLog};
use crate::errors::{ConfigError, HostError};
use crate::host::{Action, AuthorizeService, Context, ContextFactory, ContextGuard, DSpaceObject, Item};

pub const TASK_ID: &str = "policy";

pub const CSV_HEADER: &str = "Handle, Bitstream filename";

/// Reports bitstreams readable by the anonymous group
pub struct PolicyChecker {
    bundles: Vec<String>,
    authorize: Arc<dyn AuthorizeService>,
    contexts: Arc<dyn ContextFactory>,
}

impl PolicyChecker {
    pub fn new(
        config: &PolicyCheckerConfig,
        authorize: Arc<dyn AuthorizeService>,
        contexts: Arc<dyn ContextFactory>,
        curator: &dyn Curator,
    ) -> Result<Self, ConfigError> {
        let bundles: Vec<String> = config
            .bundles
            .iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();
        if bundles.is_empty() {
            return Err(ConfigError::Missing("policy_checker.bundles".to_string()));
        }

        curator.report(CSV_HEADER);

        Ok(Self {
            bundles,
            authorize,
            contexts,
        })
    }

    pub fn bundles(&self) -> &[String] {
        &self.bundles
    }

    /// Names of bitstreams granting READ to the anonymous group, once per
    /// matching policy, in bundle order
    pub fn anonymous_bitstreams(&self, context: &dyn Context, item: &dyn Item) -> Result<Vec<String>, HostError> {
        let mut names = Vec::new();

        for bundle_name in &self.bundles {
            for bundle in item.bundles(bundle_name) {
                for bitstream in &bundle.bitstreams {
                    let policies = self.authorize.policies_for_action(context, bitstream, Action::Read)?;
                    let anonymous = policies.iter().filter(|p| p.is_anonymous()).count();
                    debug!(
                        "{} has {} READ polic(ies), {} anonymous",
                        bitstream.name,
                        policies.len(),
                        anonymous
                    );
                    names.extend(std::iter::repeat_n(bitstream.name.clone(), anonymous));
                }
            }
        }

        Ok(names)
    }

    fn check(&self, item: &dyn Item) -> Result<ResultLog, HostError> {
        let guard = ContextGuard::open(self.contexts.as_ref())?;
        let names = self.anonymous_bitstreams(guard.context(), item)?;
        guard.complete()?;

        let mut log = ResultLog::new();
        for name in names {
            log.push(format!("{},\"{}\"", item.handle(), name));
        }
        Ok(log)
    }
}

#[async_trait]
impl CurationTask for PolicyChecker {
    fn task_id(&self) -> &str {
        TASK_ID
    }

    async fn perform(&mut self, object: DSpaceObject<'_>, curator: &dyn Curator) -> CurationStatus {
        let (status, log) = match object {
            DSpaceObject::Item(item) => match self.check(item) {
                Ok(log) => {
                    info!("{} has {} anonymous bitstream(s)", item.handle(), log.lines().len());
                    (CurationStatus::Success, log)
                }
                Err(e) => {
                    error!("Could not check policies of {}: {}", item.handle(), e);
                    (CurationStatus::Error, ResultLog::new())
                }
            },
            other => {
                debug!("Not checking {} {}", other.type_name(), other.handle());
                (CurationStatus::Unset, ResultLog::new())
            }
        };

        log.flush(curator, TASK_ID, "");
        status
    }
}
