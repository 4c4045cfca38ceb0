/*!
 * Tests for the EXIF metadata copier
 */

use std::collections::BTreeMap;
use std::sync::Arc;

use dspace_ctask::app_config::ExifConfig;
use dspace_ctask::curation::{CurationStatus, CurationTask, ReportCollector};
use dspace_ctask::host::memory::{BitstreamContent, MemoryItem, MemoryRepository};
use dspace_ctask::host::DSpaceObject;
use dspace_ctask::tasks::ExifExtractor;
use dspace_ctask::tasks::exif_extractor::read_tags;

use crate::common::{
    TAG_ARTIST, TAG_MAKE, TAG_MODEL, bundle, jpeg_bitstream, jpeg_with_exif, jpeg_without_exif, pdf_bitstream,
};

fn exif_config(tags: &[(&str, &str)], clear_existing: bool) -> ExifConfig {
    ExifConfig {
        tags: tags
            .iter()
            .map(|(tag, field)| (tag.to_string(), field.to_string()))
            .collect::<BTreeMap<_, _>>(),
        clear_existing_metadata: clear_existing,
    }
}

fn extractor(repository: &Arc<MemoryRepository>, config: &ExifConfig, curator: &ReportCollector) -> ExifExtractor {
    ExifExtractor::new(config, repository.clone(), repository.clone(), curator).unwrap()
}

fn item_with_jpeg(repository: &MemoryRepository, bytes: Vec<u8>) -> MemoryItem {
    let photo = jpeg_bitstream(1, "photo.jpg");
    repository.register_bitstream(&photo, BitstreamContent::Inline(bytes), Vec::new());
    MemoryItem::new("123/10")
        .with_metadata("dc.title", Some("en"), "Photo")
        .with_bundle(bundle("ORIGINAL", vec![photo]))
}

#[test]
fn test_readTags_shouldDecodeAsciiValuesUnquoted() {
    let jpeg = jpeg_with_exif(&[(TAG_MAKE, "Canon"), (TAG_MODEL, "EOS 5D")]);
    let tags = read_tags(&jpeg).unwrap();

    assert!(tags.contains(&("make".to_string(), "Canon".to_string())));
    assert!(tags.contains(&("model".to_string(), "EOS 5D".to_string())));
}

#[test]
fn test_new_shouldReportEveryMapping() {
    let repository = Arc::new(MemoryRepository::new());
    let curator = ReportCollector::new();
    let config = exif_config(&[("Make", "dc.description"), ("GPS Latitude", "dc.coverage.spatial")], false);

    extractor(&repository, &config, &curator);

    let reports = curator.reports();
    assert_eq!(reports.len(), 2);
    assert!(reports.contains(&"Looking for make to copy to dc.description".to_string()));
    assert!(reports.contains(&"Looking for gps_latitude to copy to dc.coverage.spatial".to_string()));
}

#[tokio::test]
async fn test_perform_withMappedTag_shouldCopyValue() {
    let repository = Arc::new(MemoryRepository::new());
    let curator = ReportCollector::new();
    let mut task = extractor(&repository, &exif_config(&[("make", "dc.description")], false), &curator);
    let mut item = item_with_jpeg(&repository, jpeg_with_exif(&[(TAG_MAKE, "Canon"), (TAG_ARTIST, "Jane")]));

    let status = task.perform(DSpaceObject::Item(&mut item), &curator).await;

    assert_eq!(status, CurationStatus::Success);
    let values = item.values_of("dc.description");
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].value, "Canon");
    assert_eq!(values[0].language, None);
    assert!(curator.reports().contains(&"123/10 added dc.description = Canon".to_string()));
    assert_eq!(repository.context_stats().outstanding(), 0);
    assert!(repository.context_stats().commits.load(std::sync::atomic::Ordering::SeqCst) >= 1);
}

#[tokio::test]
async fn test_perform_withClearExisting_shouldReplacePriorValues() {
    let repository = Arc::new(MemoryRepository::new());
    let curator = ReportCollector::new();
    let mut task = extractor(&repository, &exif_config(&[("artist", "dc.contributor.author")], true), &curator);
    let mut item = item_with_jpeg(&repository, jpeg_with_exif(&[(TAG_ARTIST, "Jane Doe")]))
        .with_metadata("dc.contributor.author", Some("en"), "Someone Else");

    task.perform(DSpaceObject::Item(&mut item), &curator).await;

    let authors = item.values_of("dc.contributor.author");
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].value, "Jane Doe");
}

#[tokio::test]
async fn test_perform_withoutClearExisting_shouldAppend() {
    let repository = Arc::new(MemoryRepository::new());
    let curator = ReportCollector::new();
    let mut task = extractor(&repository, &exif_config(&[("artist", "dc.contributor.author")], false), &curator);
    let mut item = item_with_jpeg(&repository, jpeg_with_exif(&[(TAG_ARTIST, "Jane Doe")]))
        .with_metadata("dc.contributor.author", None, "Someone Else");

    task.perform(DSpaceObject::Item(&mut item), &curator).await;

    assert_eq!(item.values_of("dc.contributor.author").len(), 2);
}

#[tokio::test]
async fn test_perform_withNoMappedTags_shouldLeaveMetadataUnchanged() {
    let repository = Arc::new(MemoryRepository::new());
    let curator = ReportCollector::new();
    let mut task = extractor(&repository, &exif_config(&[("gps_latitude", "dc.coverage.spatial")], false), &curator);
    let mut item = item_with_jpeg(&repository, jpeg_with_exif(&[(TAG_MAKE, "Canon")]));
    let before = item.persisted_metadata().to_vec();

    let status = task.perform(DSpaceObject::Item(&mut item), &curator).await;

    assert_eq!(status, CurationStatus::Success);
    assert_eq!(item.persisted_metadata(), before.as_slice());
}

#[tokio::test]
async fn test_perform_withJpegWithoutExif_shouldLeaveMetadataUnchanged() {
    let repository = Arc::new(MemoryRepository::new());
    let curator = ReportCollector::new();
    let mut task = extractor(&repository, &exif_config(&[("make", "dc.description")], false), &curator);
    let mut item = item_with_jpeg(&repository, jpeg_without_exif());

    let status = task.perform(DSpaceObject::Item(&mut item), &curator).await;

    assert_eq!(status, CurationStatus::Success);
    assert!(item.values_of("dc.description").is_empty());
}

#[tokio::test]
async fn test_perform_withCorruptImage_shouldReportAndContinue() {
    let repository = Arc::new(MemoryRepository::new());
    let curator = ReportCollector::new();
    let mut task = extractor(&repository, &exif_config(&[("make", "dc.description")], false), &curator);

    let broken = jpeg_bitstream(1, "broken.jpg");
    let good = jpeg_bitstream(2, "good.jpg");
    repository.register_bitstream(&broken, BitstreamContent::Inline(b"this is certainly not an image".to_vec()), Vec::new());
    repository.register_bitstream(&good, BitstreamContent::Inline(jpeg_with_exif(&[(TAG_MAKE, "Nikon")])), Vec::new());
    let mut item = MemoryItem::new("123/11").with_bundle(bundle("ORIGINAL", vec![broken, good]));

    let status = task.perform(DSpaceObject::Item(&mut item), &curator).await;

    assert_eq!(status, CurationStatus::Success);
    let reports = curator.reports();
    assert!(reports.iter().any(|r| r.starts_with("123/11: Error extracting EXIF:")));
    assert_eq!(item.values_of("dc.description")[0].value, "Nikon");
}

#[tokio::test]
async fn test_perform_withMissingContent_shouldReportRetrievalError() {
    let repository = Arc::new(MemoryRepository::new());
    let curator = ReportCollector::new();
    let mut task = extractor(&repository, &exif_config(&[("make", "dc.description")], false), &curator);

    let photo = jpeg_bitstream(5, "gone.jpg");
    repository.register_bitstream(&photo, BitstreamContent::Missing, Vec::new());
    let mut item = MemoryItem::new("123/12").with_bundle(bundle("ORIGINAL", vec![photo]));

    let status = task.perform(DSpaceObject::Item(&mut item), &curator).await;

    assert_eq!(status, CurationStatus::Success);
    assert!(curator.reports().iter().any(|r| r.starts_with("123/12: Error extracting EXIF:")));
}

#[tokio::test]
async fn test_perform_shouldIgnoreNonJpegAndOtherBundles() {
    let repository = Arc::new(MemoryRepository::new());
    let curator = ReportCollector::new();
    let mut task = extractor(&repository, &exif_config(&[("make", "dc.description")], false), &curator);

    let pdf = pdf_bitstream(1, "paper.pdf");
    let thumb = jpeg_bitstream(2, "thumb.jpg");
    repository.register_bitstream(&pdf, BitstreamContent::Inline(jpeg_with_exif(&[(TAG_MAKE, "A")])), Vec::new());
    repository.register_bitstream(&thumb, BitstreamContent::Inline(jpeg_with_exif(&[(TAG_MAKE, "B")])), Vec::new());
    let mut item = MemoryItem::new("123/13")
        .with_bundle(bundle("ORIGINAL", vec![pdf]))
        .with_bundle(bundle("THUMBNAIL", vec![thumb]));

    task.perform(DSpaceObject::Item(&mut item), &curator).await;

    assert!(item.values_of("dc.description").is_empty());
}

#[tokio::test]
async fn test_perform_withPersistenceFailure_shouldReturnError() {
    let repository = Arc::new(MemoryRepository::new());
    let curator = ReportCollector::new();
    let mut task = extractor(&repository, &exif_config(&[("make", "dc.description")], false), &curator);
    let mut item = item_with_jpeg(&repository, jpeg_with_exif(&[(TAG_MAKE, "Canon")]));
    item.fail_updates(1);

    let status = task.perform(DSpaceObject::Item(&mut item), &curator).await;

    assert_eq!(status, CurationStatus::Error);
    assert!(
        curator
            .reports()
            .contains(&"123/10: An error occurred updating dc.description: Canon".to_string())
    );
    // The final update still persists the buffered value
    assert_eq!(item.values_of("dc.description").len(), 1);
}

#[tokio::test]
async fn test_perform_withFailingFinalUpdate_shouldReportItemError() {
    let repository = Arc::new(MemoryRepository::new());
    let curator = ReportCollector::new();
    let mut task = extractor(&repository, &exif_config(&[("make", "dc.description")], false), &curator);
    let mut item = MemoryItem::new("123/14");
    item.fail_updates(1);

    let status = task.perform(DSpaceObject::Item(&mut item), &curator).await;

    assert_eq!(status, CurationStatus::Error);
    assert!(
        curator
            .reports()
            .contains(&"123/14: An error occurred updating item metadata".to_string())
    );
}

#[tokio::test]
async fn test_perform_withoutContext_shouldReturnErrorAndReleaseNothing() {
    let repository = Arc::new(MemoryRepository::new());
    let curator = ReportCollector::new();
    let mut task = extractor(&repository, &exif_config(&[("make", "dc.description")], false), &curator);
    let mut item = item_with_jpeg(&repository, jpeg_with_exif(&[(TAG_MAKE, "Canon")]));
    repository.refuse_contexts(true);

    let status = task.perform(DSpaceObject::Item(&mut item), &curator).await;

    assert_eq!(status, CurationStatus::Error);
    assert!(item.values_of("dc.description").is_empty());
    assert_eq!(repository.context_stats().outstanding(), 0);
}

#[tokio::test]
async fn test_perform_onCommunity_shouldSkip() {
    let repository = Arc::new(MemoryRepository::new());
    let curator = ReportCollector::new();
    let mut task = extractor(&repository, &exif_config(&[("make", "dc.description")], false), &curator);

    let status = task.perform(DSpaceObject::Community { handle: "123/1" }, &curator).await;

    assert_eq!(status, CurationStatus::Skip);
}
