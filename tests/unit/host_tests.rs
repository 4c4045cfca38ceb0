/*!
 * Tests for the host model and the in-memory repository
 */

use anyhow::Result;
use std::sync::Arc;

use dspace_ctask::curation::{Curator, ReportCollector};
use dspace_ctask::file_utils::FileManager;
use dspace_ctask::host::memory::{BitstreamContent, MemoryRepository};
use dspace_ctask::host::{
    Action, AuthorizeService, BitstreamStore, ContextFactory, ContextGuard, DSpaceObject, Item, LanguageFilter,
    MetadataField,
};

use crate::common::{create_temp_dir, create_test_file, jpeg_bitstream};

const RECORD: &str = r#"{
    "handle": "123456789/7",
    "metadata": [
        { "schema": "dc", "element": "title", "language": "en", "value": "A record" },
        { "schema": "dc", "element": "identifier", "qualifier": "uri", "value": "http://old/7" }
    ],
    "bundles": [
        {
            "name": "ORIGINAL",
            "bitstreams": [
                {
                    "id": 70,
                    "name": "photo.jpg",
                    "format_description": "JPEG",
                    "path": "files/photo.jpg",
                    "policies": [ { "action": "READ", "group_id": 0 } ]
                }
            ]
        }
    ]
}"#;

#[test]
fn test_metadataField_parse_shouldHandleQualifiers() {
    let field = MetadataField::parse("dc.description.abstract").unwrap();
    assert_eq!(field.schema, "dc");
    assert_eq!(field.element, "description");
    assert_eq!(field.qualifier.as_deref(), Some("abstract"));
    assert_eq!(field.to_string(), "dc.description.abstract");

    let field: MetadataField = "dc.title".parse().unwrap();
    assert_eq!(field.qualifier, None);

    let field = MetadataField::parse("dc.title.alternative.extra").unwrap();
    assert_eq!(field.to_string(), "dc.title.alternative");

    assert!(MetadataField::parse("dc").is_err());
    assert!(MetadataField::parse(".title").is_err());
}

#[test]
fn test_languageFilter_matches_shouldDistinguishUnsetAndAny() {
    assert!(LanguageFilter::Any.matches(None));
    assert!(LanguageFilter::Any.matches(Some("en")));
    assert!(LanguageFilter::Unset.matches(None));
    assert!(!LanguageFilter::Unset.matches(Some("en")));
    assert!(LanguageFilter::Is("en").matches(Some("en")));
    assert!(!LanguageFilter::Is("en").matches(Some("en_US")));
    assert!(!LanguageFilter::Is("en").matches(None));
}

#[test]
fn test_dSpaceObject_shouldExposeHandleAndType() {
    let collection = DSpaceObject::Collection { handle: "1/2" };
    assert_eq!(collection.handle(), "1/2");
    assert_eq!(collection.type_name(), "collection");
}

#[test]
fn test_loadItem_shouldRegisterBitstreamsRelativeToRecord() -> Result<()> {
    let dir = create_temp_dir()?;
    let record_path = create_test_file(dir.path(), "item.json", RECORD)?;
    create_test_file(dir.path(), "files/photo.jpg", "jpeg bytes")?;

    let repository = MemoryRepository::new();
    let item = repository.load_item(&record_path)?;

    assert_eq!(item.handle(), "123456789/7");
    assert_eq!(item.values_of("dc.identifier.uri")[0].value, "http://old/7");

    let bundles = item.bundles("ORIGINAL");
    assert_eq!(bundles.len(), 1);
    let photo = &bundles[0].bitstreams[0];
    assert!(photo.is_jpeg());

    let guard = ContextGuard::open(&repository)?;
    assert_eq!(repository.retrieve(guard.context(), photo)?, b"jpeg bytes".to_vec());
    let policies = repository.policies_for_action(guard.context(), photo, Action::Read)?;
    assert_eq!(policies.len(), 1);
    assert!(policies[0].is_anonymous());
    guard.complete()?;

    Ok(())
}

#[test]
fn test_saveItem_shouldWritePersistedMetadataOnly() -> Result<()> {
    let dir = create_temp_dir()?;
    let record_path = create_test_file(dir.path(), "item.json", RECORD)?;

    let repository = MemoryRepository::new();
    let mut item = repository.load_item(&record_path)?;
    let title = MetadataField::parse("dc.title")?;
    item.add_metadata(&title, Some("fr"), "Un enregistrement");
    repository.save_item(&item, &record_path)?;

    let unsaved = repository.load_item(&record_path)?;
    assert_eq!(unsaved.values_of("dc.title").len(), 1);

    item.update()?;
    repository.save_item(&item, &record_path)?;
    let saved = repository.load_item(&record_path)?;
    assert_eq!(saved.values_of("dc.title").len(), 2);
    assert!(FileManager::read_to_string(&record_path)?.contains("\"READ\""));

    Ok(())
}

#[test]
fn test_contextGuard_drop_shouldAbortUncompletedContext() {
    let repository = Arc::new(MemoryRepository::new());
    {
        let _guard = ContextGuard::open(&*repository).unwrap();
        assert_eq!(repository.context_stats().outstanding(), 1);
    }
    assert_eq!(repository.context_stats().outstanding(), 0);
    assert_eq!(
        repository.context_stats().aborted.load(std::sync::atomic::Ordering::SeqCst),
        1
    );
}

#[test]
fn test_refuseContexts_shouldFailOpen() {
    let repository = MemoryRepository::new();
    repository.refuse_contexts(true);
    assert!(repository.open().is_err());
    repository.refuse_contexts(false);
    assert!(repository.open().is_ok());
}

#[test]
fn test_retrieve_withClosedContext_shouldFail() {
    let repository = MemoryRepository::new();
    let photo = jpeg_bitstream(1, "a.jpg");
    repository.register_bitstream(&photo, BitstreamContent::Inline(vec![1, 2, 3]), Vec::new());

    let mut context = repository.open().unwrap();
    context.complete().unwrap();

    assert!(repository.retrieve(&*context, &photo).is_err());
}

#[test]
fn test_reportCollector_drainReports_shouldEmptyCollector() {
    let collector = ReportCollector::new();
    collector.report("one");
    collector.set_result("task", "done");

    assert_eq!(collector.drain_reports(), vec!["one".to_string()]);
    assert!(collector.reports().is_empty());
    assert_eq!(collector.last_result().as_deref(), Some("done"));
}
