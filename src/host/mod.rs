/*!
 * Collaborators supplied by the host repository.
 *
 * Tasks never reach for ambient state: the item, bitstream store,
 * authorization service and context factory are all handed to them.
 * - `content`: items, metadata fields and values, bundles and bitstreams
 * - `authorize`: resource policies
 * - `storage`: bitstream retrieval
 * - `context`: database contexts and the guard that releases them
 * - `memory`: an in-memory implementation of all of the above
 */

pub mod authorize;
pub mod content;
pub mod context;
pub mod memory;
pub mod storage;

pub use authorize::{Action, AuthorizeService, ResourcePolicy, ANONYMOUS_GROUP_ID};
pub use content::{Bitstream, Bundle, DSpaceObject, Item, LanguageFilter, MetadataField, MetadataValue};
pub use context::{Context, ContextFactory, ContextGuard};
pub use storage::BitstreamStore;
