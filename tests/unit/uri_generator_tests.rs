/*!
 * Tests for the handle-URI regenerator
 */

use dspace_ctask::curation::{CurationStatus, CurationTask, ReportCollector};
use dspace_ctask::errors::ConfigError;
use dspace_ctask::host::memory::MemoryItem;
use dspace_ctask::host::{DSpaceObject, Item, LanguageFilter};
use dspace_ctask::tasks::UriGenerator;

use crate::common::test_config;

#[tokio::test]
async fn test_perform_shouldWriteSingleCanonicalUri() {
    let mut task = UriGenerator::new(&test_config()).unwrap();
    let mut item = MemoryItem::new("123/456")
        .with_metadata("dc.identifier.uri", None, "http://old.example.org/1")
        .with_metadata("dc.identifier.uri", Some("en"), "http://old.example.org/2");
    let curator = ReportCollector::new();

    let status = task.perform(DSpaceObject::Item(&mut item), &curator).await;

    assert_eq!(status, CurationStatus::Success);
    let uris = item.values_of("dc.identifier.uri");
    assert_eq!(uris.len(), 1);
    assert_eq!(uris[0].value, "http://hdl.handle.net/123/456");
    assert_eq!(uris[0].language, None);
    assert_eq!(
        curator.last_result().unwrap(),
        "Generated URI for 123/456: http://hdl.handle.net/123/456"
    );
}

#[tokio::test]
async fn test_perform_withConfiguredField_shouldLeaveDefaultFieldAlone() {
    let mut config = test_config();
    config.handle_canonical_prefix = "https://repo.example.org/handle/".to_string();
    config.uri_generator.field = "dc.identifier.other".to_string();
    let mut task = UriGenerator::new(&config).unwrap();
    let mut item = MemoryItem::new("1/2").with_metadata("dc.identifier.uri", None, "keep-me");
    let curator = ReportCollector::new();

    task.perform(DSpaceObject::Item(&mut item), &curator).await;

    assert_eq!(item.values_of("dc.identifier.uri")[0].value, "keep-me");
    assert_eq!(
        item.values_of("dc.identifier.other")[0].value,
        "https://repo.example.org/handle/1/2"
    );
}

#[tokio::test]
async fn test_perform_withPersistenceFailure_shouldRestorePreviousValues() {
    let mut task = UriGenerator::new(&test_config()).unwrap();
    let mut item = MemoryItem::new("123/457").with_metadata("dc.identifier.uri", Some("en"), "http://old");
    item.fail_updates(1);
    let curator = ReportCollector::new();

    let status = task.perform(DSpaceObject::Item(&mut item), &curator).await;

    assert_eq!(status, CurationStatus::Error);
    assert!(
        curator
            .last_result()
            .unwrap()
            .starts_with("Failed to generate URI for 123/457:")
    );

    // The working copy holds the old value again, so a later save keeps it
    let field = task.field().clone();
    let values = item.get_metadata(&field, LanguageFilter::Any);
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].value, "http://old");
    assert_eq!(values[0].language.as_deref(), Some("en"));
}

#[tokio::test]
async fn test_perform_withPersistenceFailure_shouldKeepValueOrder() {
    let mut task = UriGenerator::new(&test_config()).unwrap();
    let mut item = MemoryItem::new("123/458")
        .with_metadata("dc.identifier.uri", None, "http://old/a")
        .with_metadata("dc.title", Some("en"), "Between")
        .with_metadata("dc.identifier.uri", Some("en"), "http://old/b");
    let before = item.metadata();
    item.fail_updates(1);
    let curator = ReportCollector::new();

    let status = task.perform(DSpaceObject::Item(&mut item), &curator).await;

    assert_eq!(status, CurationStatus::Error);
    assert_eq!(item.metadata(), before);
}

#[tokio::test]
async fn test_perform_onCommunity_shouldReturnUnset() {
    let mut task = UriGenerator::new(&test_config()).unwrap();
    let curator = ReportCollector::new();

    let status = task.perform(DSpaceObject::Community { handle: "123/1" }, &curator).await;

    assert_eq!(status, CurationStatus::Unset);
    assert!(curator.results().is_empty());
}

#[test]
fn test_new_withBadField_shouldFail() {
    let mut config = test_config();
    config.uri_generator.field = "dc..uri".to_string();
    assert!(matches!(UriGenerator::new(&config), Err(ConfigError::InvalidField { .. })));
}

#[test]
fn test_canonicalUri_shouldConcatenatePrefixAndHandle() {
    let task = UriGenerator::new(&test_config()).unwrap();
    assert_eq!(task.canonical_uri("123/456"), "http://hdl.handle.net/123/456");
}
