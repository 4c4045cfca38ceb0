/*!
 * In-memory host repository.
 *
 * Backs the command-line driver and the test suite. Items are loaded from
 * JSON item records, bitstream content comes from files next to the record or
 * from inline bytes, and contexts only count what happened to them.
 */

use anyhow::{Context as _, Result};
use log::{debug, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::HostError;
use crate::file_utils::FileManager;
use crate::host::authorize::{Action, AuthorizeService, ResourcePolicy};
use crate::host::content::{Bitstream, Bundle, Item, LanguageFilter, MetadataField, MetadataValue};
use crate::host::context::{Context, ContextFactory};
use crate::host::storage::BitstreamStore;

/// Serialized form of an item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    pub handle: String,
    #[serde(default)]
    pub metadata: Vec<MetadataValue>,
    #[serde(default)]
    pub bundles: Vec<BundleRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleRecord {
    pub name: String,
    #[serde(default)]
    pub bitstreams: Vec<BitstreamRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitstreamRecord {
    #[serde(flatten)]
    pub bitstream: Bitstream,
    /// Content file, relative to the record file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<ResourcePolicy>,
}

/// Where a stored bitstream's bytes live
#[derive(Debug, Clone)]
pub enum BitstreamContent {
    Inline(Vec<u8>),
    File(PathBuf),
    Missing,
}

#[derive(Debug, Clone)]
struct StoredBitstream {
    content: BitstreamContent,
    policies: Vec<ResourcePolicy>,
}

/// An item held in memory. Changes become visible in
/// `persisted_metadata` only after a successful `update`.
#[derive(Debug, Clone)]
pub struct MemoryItem {
    handle: String,
    working: Vec<MetadataValue>,
    persisted: Vec<MetadataValue>,
    bundles: Vec<Bundle>,
    failing_updates: usize,
    update_count: usize,
}

impl MemoryItem {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            working: Vec::new(),
            persisted: Vec::new(),
            bundles: Vec::new(),
            failing_updates: 0,
            update_count: 0,
        }
    }

    /// Add an already-persisted value. Malformed field paths are ignored.
    pub fn with_metadata(mut self, field: &str, language: Option<&str>, value: &str) -> Self {
        let field = match MetadataField::parse(field) {
            Ok(field) => field,
            Err(e) => {
                warn!("Ignoring value for {}: {}", field, e);
                return self;
            }
        };
        let value = MetadataValue::new(field, language, value);
        self.working.push(value.clone());
        self.persisted.push(value);
        self
    }

    pub fn with_bundle(mut self, bundle: Bundle) -> Self {
        self.bundles.push(bundle);
        self
    }

    /// Make the next `count` calls to `update` fail
    pub fn fail_updates(&mut self, count: usize) {
        self.failing_updates = count;
    }

    pub fn persisted_metadata(&self) -> &[MetadataValue] {
        &self.persisted
    }

    /// Persisted values of one field, any language
    pub fn values_of(&self, field: &str) -> Vec<MetadataValue> {
        match MetadataField::parse(field) {
            Ok(field) => self.persisted.iter().filter(|v| v.field == field).cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Number of successful `update` calls
    pub fn update_count(&self) -> usize {
        self.update_count
    }
}

impl Item for MemoryItem {
    fn handle(&self) -> &str {
        &self.handle
    }

    fn get_metadata(&self, field: &MetadataField, language: LanguageFilter<'_>) -> Vec<MetadataValue> {
        self.working
            .iter()
            .filter(|v| &v.field == field && language.matches(v.language.as_deref()))
            .cloned()
            .collect()
    }

    fn add_metadata(&mut self, field: &MetadataField, language: Option<&str>, value: &str) {
        self.working.push(MetadataValue::new(field.clone(), language, value));
    }

    fn clear_metadata(&mut self, field: &MetadataField, language: LanguageFilter<'_>) {
        self.working
            .retain(|v| !(&v.field == field && language.matches(v.language.as_deref())));
    }

    fn metadata(&self) -> Vec<MetadataValue> {
        self.working.clone()
    }

    fn set_metadata(&mut self, values: Vec<MetadataValue>) {
        self.working = values;
    }

    fn bundles(&self, name: &str) -> Vec<Bundle> {
        self.bundles.iter().filter(|b| b.name == name).cloned().collect()
    }

    fn update(&mut self) -> Result<(), HostError> {
        if self.failing_updates > 0 {
            self.failing_updates -= 1;
            return Err(HostError::Persistence(format!(
                "update of {} rejected",
                self.handle
            )));
        }
        self.persisted = self.working.clone();
        self.update_count += 1;
        Ok(())
    }
}

/// Counters shared between a repository and the contexts it opened
#[derive(Debug, Default)]
pub struct ContextStats {
    pub opened: AtomicUsize,
    pub commits: AtomicUsize,
    pub completed: AtomicUsize,
    pub aborted: AtomicUsize,
}

impl ContextStats {
    /// Contexts opened but neither completed nor aborted
    pub fn outstanding(&self) -> usize {
        let released = self.completed.load(Ordering::SeqCst) + self.aborted.load(Ordering::SeqCst);
        self.opened.load(Ordering::SeqCst).saturating_sub(released)
    }
}

#[derive(Debug)]
struct MemoryContext {
    stats: Arc<ContextStats>,
    open: bool,
}

impl Context for MemoryContext {
    fn commit(&mut self) -> Result<(), HostError> {
        if !self.open {
            return Err(HostError::Context("context is closed".to_string()));
        }
        self.stats.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn complete(&mut self) -> Result<(), HostError> {
        if !self.open {
            return Err(HostError::Context("context is closed".to_string()));
        }
        self.open = false;
        self.stats.completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn abort(&mut self) {
        if self.open {
            self.open = false;
            self.stats.aborted.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_valid(&self) -> bool {
        self.open
    }
}

/// Bitstream storage, authorization and contexts for in-memory items
#[derive(Debug, Default)]
pub struct MemoryRepository {
    bitstreams: RwLock<HashMap<u64, StoredBitstream>>,
    stats: Arc<ContextStats>,
    refuse_contexts: RwLock<bool>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_bitstream(
        &self,
        bitstream: &Bitstream,
        content: BitstreamContent,
        policies: Vec<ResourcePolicy>,
    ) {
        self.bitstreams
            .write()
            .insert(bitstream.id, StoredBitstream { content, policies });
    }

    /// Drop the stored content and policies of an item's bitstreams
    pub fn release_item(&self, item: &MemoryItem) {
        let mut stored = self.bitstreams.write();
        for bundle in &item.bundles {
            for bitstream in &bundle.bitstreams {
                stored.remove(&bitstream.id);
            }
        }
    }

    /// Number of bitstreams currently registered
    pub fn bitstream_count(&self) -> usize {
        self.bitstreams.read().len()
    }

    pub fn context_stats(&self) -> &ContextStats {
        &self.stats
    }

    /// Make `open` fail until switched back
    pub fn refuse_contexts(&self, refuse: bool) {
        *self.refuse_contexts.write() = refuse;
    }

    /// Build an item from a record, registering its bitstreams.
    /// Relative content paths resolve against `base_dir`.
    pub fn item_from_record(&self, record: ItemRecord, base_dir: &Path) -> MemoryItem {
        let mut item = MemoryItem::new(record.handle);
        item.working = record.metadata.clone();
        item.persisted = record.metadata;

        for bundle in record.bundles {
            let mut bitstreams = Vec::with_capacity(bundle.bitstreams.len());
            for stored in bundle.bitstreams {
                let content = match &stored.path {
                    Some(path) if path.is_absolute() => BitstreamContent::File(path.clone()),
                    Some(path) => BitstreamContent::File(base_dir.join(path)),
                    None => BitstreamContent::Missing,
                };
                self.register_bitstream(&stored.bitstream, content, stored.policies);
                bitstreams.push(stored.bitstream);
            }
            item.bundles.push(Bundle { name: bundle.name, bitstreams });
        }

        item
    }

    /// Record for an item, carrying its persisted metadata
    pub fn record_for(&self, item: &MemoryItem) -> ItemRecord {
        let stored = self.bitstreams.read();
        let bundles = item
            .bundles
            .iter()
            .map(|bundle| BundleRecord {
                name: bundle.name.clone(),
                bitstreams: bundle
                    .bitstreams
                    .iter()
                    .map(|bitstream| {
                        let entry = stored.get(&bitstream.id);
                        BitstreamRecord {
                            bitstream: bitstream.clone(),
                            path: entry.and_then(|e| match &e.content {
                                BitstreamContent::File(path) => Some(path.clone()),
                                _ => None,
                            }),
                            policies: entry.map(|e| e.policies.clone()).unwrap_or_default(),
                        }
                    })
                    .collect(),
            })
            .collect();

        ItemRecord {
            handle: item.handle.clone(),
            metadata: item.persisted.clone(),
            bundles,
        }
    }

    pub fn load_item(&self, path: &Path) -> Result<MemoryItem> {
        let json = FileManager::read_to_string(path)?;
        let record: ItemRecord = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse item record: {:?}", path))?;
        let base_dir = path.parent().unwrap_or(Path::new("."));
        debug!("Loaded item {} from {:?}", record.handle, path);
        Ok(self.item_from_record(record, base_dir))
    }

    pub fn save_item(&self, item: &MemoryItem, path: &Path) -> Result<()> {
        let record = self.record_for(item);
        let json = serde_json::to_string_pretty(&record)
            .context("Failed to serialize item record")?;
        FileManager::write_to_file(path, &json)
    }
}

impl BitstreamStore for MemoryRepository {
    fn retrieve(&self, context: &dyn Context, bitstream: &Bitstream) -> Result<Vec<u8>, HostError> {
        if !context.is_valid() {
            return Err(HostError::Context("context is closed".to_string()));
        }
        let content = self
            .bitstreams
            .read()
            .get(&bitstream.id)
            .map(|stored| stored.content.clone())
            .ok_or_else(|| HostError::Storage(format!("unknown bitstream {}", bitstream.id)))?;

        match content {
            BitstreamContent::Inline(bytes) => Ok(bytes),
            BitstreamContent::File(path) => std::fs::read(&path)
                .map_err(|e| HostError::Storage(format!("{}: {}", path.display(), e))),
            BitstreamContent::Missing => Err(HostError::Storage(format!(
                "bitstream {} has no content",
                bitstream.name
            ))),
        }
    }
}

impl AuthorizeService for MemoryRepository {
    fn policies_for_action(
        &self,
        context: &dyn Context,
        bitstream: &Bitstream,
        action: Action,
    ) -> Result<Vec<ResourcePolicy>, HostError> {
        if !context.is_valid() {
            return Err(HostError::Context("context is closed".to_string()));
        }
        let stored = self.bitstreams.read();
        let policies = stored
            .get(&bitstream.id)
            .ok_or_else(|| HostError::Authorization(format!("unknown bitstream {}", bitstream.id)))?
            .policies
            .iter()
            .filter(|p| p.action == action)
            .cloned()
            .collect();
        Ok(policies)
    }
}

impl ContextFactory for MemoryRepository {
    fn open(&self) -> Result<Box<dyn Context>, HostError> {
        if *self.refuse_contexts.read() {
            return Err(HostError::Context("database unavailable".to_string()));
        }
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryContext {
            stats: Arc::clone(&self.stats),
            open: true,
        }))
    }
}
