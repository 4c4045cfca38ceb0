/*!
 * Contract between curation tasks and the curation engine that drives them.
 *
 * The engine hands each object to `CurationTask::perform`, collects the
 * returned status, and receives human readable output through a `Curator`.
 */

use async_trait::async_trait;
use std::fmt;

use crate::host::DSpaceObject;

pub mod report;

pub use report::{ReportCollector, ResultLog};

/// Outcome of one task invocation, as interpreted by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurationStatus {
    /// The task ran and did its work
    Success,
    /// The object was not applicable to the task
    Skip,
    /// The task ran and something went wrong
    Error,
    /// The task did not decide (e.g. it never ran on this object)
    #[default]
    Unset,
}

impl CurationStatus {
    /// Integer code used by the engine's curation log
    pub fn code(&self) -> i32 {
        match self {
            Self::Unset => -2,
            Self::Error => -1,
            Self::Success => 0,
            Self::Skip => 2,
        }
    }
}

impl fmt::Display for CurationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "success",
            Self::Skip => "skip",
            Self::Error => "error",
            Self::Unset => "unset",
        };
        f.write_str(name)
    }
}

/// Reporting sink owned by the engine
pub trait Curator: Send + Sync {
    /// Append text to the run's report stream
    fn report(&self, text: &str);

    /// Record the result text for one task invocation
    fn set_result(&self, task_id: &str, text: &str);
}

/// A task the engine can run against one object at a time
#[async_trait]
pub trait CurationTask: Send {
    /// Name the task is registered under
    fn task_id(&self) -> &str;

    /// Run against one object
    async fn perform(&mut self, object: DSpaceObject<'_>, curator: &dyn Curator) -> CurationStatus;
}
