use crate::errors::HostError;
use crate::host::content::Bitstream;
use crate::host::context::Context;

/// Host bitstream storage
pub trait BitstreamStore: Send + Sync {
    /// Full content of `bitstream`
    fn retrieve(&self, context: &dyn Context, bitstream: &Bitstream) -> Result<Vec<u8>, HostError>;
}
