//! API integration tests against the in-process router.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{TestConfig, TestFixture};
use pictovoz_core::suggest::SuggestionConfig;
use pictovoz_core::testing::MockResponse;
use pictovoz_core::vocabulary::MAX_SENTENCE_LENGTH;

/// Debounce plus margin for an instant mock reply.
const SETTLE: Duration = Duration::from_millis(400);

fn ids(words: &Value) -> Vec<String> {
    words
        .as_array()
        .expect("array of words")
        .iter()
        .map(|w| w["id"].as_str().unwrap().to_string())
        .collect()
}

// ============================================================================
// Health, config, metrics
// ============================================================================

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/config").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["suggestions"]["cache_capacity"], 20);
    assert_eq!(response.body["server"]["max_sessions"], 8);
    assert!(response.body.get("remote").is_none());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/v1/health").await;

    let (status, body) = fixture.get_text("/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("pictovoz_http_requests_total"));
    assert!(body.contains("# TYPE"));
}

#[tokio::test]
async fn test_cross_origin_requests_allowed() {
    let fixture = TestFixture::new().await;

    let request = Request::builder()
        .uri("/api/v1/health")
        .header("Origin", "http://tablet.local")
        .body(Body::empty())
        .unwrap();
    let response = fixture.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");

    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/api/v1/sessions")
        .header("Origin", "http://tablet.local")
        .header("Access-Control-Request-Method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = fixture.router.clone().oneshot(preflight).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key("access-control-allow-methods"));
}

// ============================================================================
// Vocabulary, rules, templates
// ============================================================================

#[tokio::test]
async fn test_list_vocabulary() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/vocabulary").await;
    assert_eq!(response.status, StatusCode::OK);
    let total = response.body["total"].as_u64().unwrap();
    assert!(total > 50);

    let response = fixture.get("/api/v1/vocabulary?category=colores").await;
    assert_eq!(response.status, StatusCode::OK);
    let words = response.body["words"].as_array().unwrap();
    assert!(!words.is_empty());
    assert!(words.iter().all(|w| w["category"] == "colores"));
    assert!(ids(&response.body["words"]).contains(&"rojo".to_string()));
}

#[tokio::test]
async fn test_vocabulary_location_filter() {
    let fixture = TestFixture::new().await;
    let all = fixture.get("/api/v1/vocabulary").await.body["total"]
        .as_u64()
        .unwrap();

    let response = fixture.get("/api/v1/vocabulary?location=parque").await;
    assert_eq!(response.status, StatusCode::OK);
    let park = ids(&response.body["words"]);
    assert!(park.contains(&"pelota".to_string()));
    assert!(park.contains(&"yo".to_string()));
    assert!(!park.contains(&"medicina".to_string()));
    assert_eq!(response.body["total"].as_u64().unwrap(), all - 1);

    let response = fixture.get("/api/v1/vocabulary?location=all").await;
    assert_eq!(response.body["total"].as_u64().unwrap(), all);

    let response = fixture
        .get("/api/v1/vocabulary?category=sustantivos&location=hospital")
        .await;
    let hospital = ids(&response.body["words"]);
    assert!(hospital.contains(&"medicina".to_string()));
    assert!(!hospital.contains(&"pelota".to_string()));
}

#[tokio::test]
async fn test_vocabulary_search() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/vocabulary?q=WATER").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(ids(&response.body["words"]), vec!["agua"]);

    let response = fixture.get("/api/v1/vocabulary?q=%20%20").await;
    assert!(response.body["total"].as_u64().unwrap() > 50);
}

#[tokio::test]
async fn test_unknown_category_rejected() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/vocabulary?category=planetas").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("planetas"));
}

#[tokio::test]
async fn test_rule_suggestions() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post("/api/v1/suggest/rules", json!({ "word_ids": ["yo"] }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        ids(&response.body["suggestions"]),
        vec!["quiero", "necesito", "tengo", "puedo", "me_gusta"]
    );
    assert!(response.body["templates"].as_array().unwrap().is_empty());

    let response = fixture
        .post("/api/v1/suggest/rules", json!({ "word_ids": ["yo", "quiero"] }))
        .await;
    let suggestions = ids(&response.body["suggestions"]);
    assert!(!suggestions.contains(&"yo".to_string()));
    assert!(!suggestions.contains(&"quiero".to_string()));
    let templates = response.body["templates"].as_array().unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0]["id"], "yo_quiero");
    assert!(!templates[0]["fills"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_rule_suggestions_empty_sentence() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post("/api/v1/suggest/rules", json!({ "word_ids": [] }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["suggestions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_rule_suggestions_unknown_word() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post("/api/v1/suggest/rules", json!({ "word_ids": ["yo", "nave_espacial"] }))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let fixture = TestFixture::new().await;
    let response = fixture.post_raw("/api/v1/suggest/rules", "{not json").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_templates() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/templates").await;
    assert_eq!(response.status, StatusCode::OK);

    let templates = response.body.as_array().unwrap();
    assert_eq!(templates.len(), 6);
    assert_eq!(templates[0]["id"], "yo_quiero");
    assert_eq!(templates[0]["label"], "Yo quiero ___");
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn test_session_lifecycle() {
    let fixture = TestFixture::with_config(TestConfig {
        with_remote: false,
        ..Default::default()
    })
    .await;
    let id = fixture.create_session().await;

    let response = fixture.add_words(&id, &["yo", "quiero", "agua"]).await;
    assert_eq!(response.body["text"], "Yo Quiero Agua");
    assert_eq!(response.body["sentence"].as_array().unwrap().len(), 3);
    assert_eq!(response.body["suggestions"]["source"], "rules");
    assert_eq!(response.body["suggestions"]["is_loading"], false);

    let response = fixture.get(&format!("/api/v1/sessions/{}", id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], id.as_str());

    let response = fixture
        .delete(&format!("/api/v1/sessions/{}/words/last", id))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(ids(&response.body["sentence"]), vec!["yo", "quiero"]);

    let response = fixture
        .delete(&format!("/api/v1/sessions/{}/words", id))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["sentence"].as_array().unwrap().is_empty());
    assert!(response.body["suggestions"]["suggestions"]
        .as_array()
        .unwrap()
        .is_empty());

    let response = fixture.delete(&format!("/api/v1/sessions/{}", id)).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = fixture.get(&format!("/api/v1/sessions/{}", id)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_session_and_word() {
    let fixture = TestFixture::new().await;

    let missing = "550e8400-e29b-41d4-a716-446655440000";
    let response = fixture
        .get(&format!("/api/v1/sessions/{}/suggestions", missing))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = fixture.get("/api/v1/sessions/not-a-uuid").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let id = fixture.create_session().await;
    let response = fixture
        .post(
            &format!("/api/v1/sessions/{}/words", id),
            json!({ "word_id": "nave_espacial" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("nave_espacial"));
}

#[tokio::test]
async fn test_full_sentence_conflict() {
    let fixture = TestFixture::with_config(TestConfig {
        with_remote: false,
        ..Default::default()
    })
    .await;
    let id = fixture.create_session().await;

    let words = vec!["agua"; MAX_SENTENCE_LENGTH];
    fixture.add_words(&id, &words).await;

    let response = fixture
        .post(
            &format!("/api/v1/sessions/{}/words", id),
            json!({ "word_id": "agua" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_session_limit() {
    let fixture = TestFixture::with_config(TestConfig {
        max_sessions: 2,
        ..Default::default()
    })
    .await;
    fixture.create_session().await;
    fixture.create_session().await;

    let response = fixture.post("/api/v1/sessions", Value::Null).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test(start_paused = true)]
async fn test_remote_suggestions_through_session() {
    let fixture = TestFixture::new().await;
    fixture
        .remote
        .push_response(MockResponse::ids(&["agua", "comer"]))
        .await;
    let id = fixture.create_session().await;

    let response = fixture.add_words(&id, &["yo"]).await;
    assert_eq!(response.body["suggestions"]["is_loading"], true);
    assert_eq!(response.body["suggestions"]["phase"], "debouncing");

    tokio::time::sleep(SETTLE).await;

    let response = fixture
        .get(&format!("/api/v1/sessions/{}/suggestions", id))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["source"], "remote");
    assert_eq!(response.body["is_loading"], false);
    assert_eq!(ids(&response.body["suggestions"]), vec!["agua", "comer"]);
    assert_eq!(fixture.remote.call_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_status_reports_breaker() {
    let fixture = TestFixture::with_config(TestConfig {
        suggestions: SuggestionConfig {
            failure_threshold: 2,
            ..Default::default()
        },
        ..Default::default()
    })
    .await;
    let id = fixture.create_session().await;

    // Unscripted remote: every call fails
    for word in ["yo", "quiero"] {
        fixture.add_words(&id, &[word]).await;
        tokio::time::sleep(SETTLE).await;
    }

    let response = fixture.get(&format!("/api/v1/sessions/{}/status", id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["remote_configured"], true);
    assert_eq!(response.body["breaker"]["state"], "open");
    assert_eq!(response.body["breaker"]["consecutive_failures"], 2);
    assert_eq!(response.body["cache_entries"], 0);

    // With the breaker open the next word resolves from rules immediately
    let response = fixture.add_words(&id, &["agua"]).await;
    assert_eq!(response.body["suggestions"]["is_loading"], false);
    assert_eq!(response.body["suggestions"]["phase"], "resolved");
    assert_eq!(fixture.remote.call_count().await, 2);
}

#[tokio::test(start_paused = true)]
async fn test_sessions_are_isolated() {
    let fixture = TestFixture::new().await;
    fixture.remote.push_response(MockResponse::ids(&["jugar"])).await;

    let first = fixture.create_session().await;
    let second = fixture.create_session().await;

    fixture.add_words(&first, &["yo"]).await;
    tokio::time::sleep(SETTLE).await;

    let response = fixture
        .get(&format!("/api/v1/sessions/{}/status", first))
        .await;
    assert_eq!(response.body["cache_entries"], 1);

    let response = fixture
        .get(&format!("/api/v1/sessions/{}/status", second))
        .await;
    assert_eq!(response.body["cache_entries"], 0);
    assert_eq!(response.body["phase"], "idle");
}
