use log::warn;

use crate::errors::HostError;

/// A host database context (one unit of work)
pub trait Context: Send + Sync {
    /// Commit pending work and keep the context open
    fn commit(&mut self) -> Result<(), HostError>;

    /// Commit pending work and close the context
    fn complete(&mut self) -> Result<(), HostError>;

    /// Discard pending work and close the context
    fn abort(&mut self);

    /// False once the context has been completed or aborted
    fn is_valid(&self) -> bool;
}

/// Opens host contexts
pub trait ContextFactory: Send + Sync {
    fn open(&self) -> Result<Box<dyn Context>, HostError>;
}

/// Owns a context for the span of one task invocation.
///
/// `complete` releases it on the success path; dropping an uncompleted guard
/// aborts it, so every early return and error path releases it too.
pub struct ContextGuard {
    inner: Box<dyn Context>,
    released: bool,
}

impl ContextGuard {
    pub fn open(factory: &dyn ContextFactory) -> Result<Self, HostError> {
        Ok(Self {
            inner: factory.open()?,
            released: false,
        })
    }

    pub fn context(&self) -> &dyn Context {
        self.inner.as_ref()
    }

    pub fn commit(&mut self) -> Result<(), HostError> {
        self.inner.commit()
    }

    pub fn complete(mut self) -> Result<(), HostError> {
        self.released = true;
        self.inner.complete()
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        if !self.released && self.inner.is_valid() {
            warn!("Context was not completed, aborting");
            self.inner.abort();
        }
    }
}
