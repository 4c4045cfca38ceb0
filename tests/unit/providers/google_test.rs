/*!
 * Tests for the Google Translate client against a local mock server
 */

use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dspace_ctask::errors::ProviderError;
use dspace_ctask::providers::TranslationProvider;
use dspace_ctask::providers::google::Google;

const API_PATH: &str = "/language/translate/v2";

fn client(server: &MockServer, timeout_secs: u64) -> Google {
    Google::new("test-key", format!("{}{}", server.uri(), API_PATH), timeout_secs)
}

#[tokio::test]
async fn test_translate_withSuccessResponse_shouldReturnUnescapedText() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("key", "test-key"))
        .and(query_param("source", "en"))
        .and(query_param("target", "fr"))
        .and(query_param("q", "Fish & chips"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "translations": [ { "translatedText": "Poisson &amp; frites" } ] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let translated = client(&server, 5).translate("en", "fr", "Fish & chips").await;

    assert_eq!(translated.as_deref(), Some("Poisson & frites"));
}

#[tokio::test]
async fn test_requestTranslation_withErrorStatus_shouldReturnApiError() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("Daily Limit Exceeded"))
        .mount(&server)
        .await;

    let google = client(&server, 5);
    let result = google.request_translation("en", "de", "Hello").await;

    match result {
        Err(ProviderError::ApiError { status_code, message }) => {
            assert_eq!(status_code, 403);
            assert!(message.contains("Daily Limit"));
        }
        other => panic!("Expected ApiError, got {:?}", other),
    }
    assert!(google.translate("en", "de", "Hello").await.is_none());
}

#[tokio::test]
async fn test_requestTranslation_withMalformedBody_shouldReturnParseError() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let result = client(&server, 5).request_translation("en", "de", "Hello").await;

    assert!(matches!(result, Err(ProviderError::ParseError(_))));
}

#[tokio::test]
async fn test_requestTranslation_withNoCandidates_shouldReturnEmptyResponse() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": { "translations": [] } })),
        )
        .mount(&server)
        .await;

    let result = client(&server, 5).request_translation("en", "de", "Hello").await;

    assert!(matches!(result, Err(ProviderError::EmptyResponse)));
}

#[tokio::test]
async fn test_translate_withSlowServer_shouldTimeOut() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": { "translations": [ { "translatedText": "late" } ] } }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let google = client(&server, 1);
    let result = google.request_translation("en", "de", "Hello").await;

    assert!(matches!(result, Err(ProviderError::RequestFailed(_))));
}
