//! Common test utilities for API testing with mocks.
//!
//! Builds the router in-process with a `MockRemoteSuggester` injected, so
//! requests go through every layer without binding a socket or calling an
//! LLM.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use pictovoz_core::suggest::RemoteSuggester;
use pictovoz_core::testing::MockRemoteSuggester;
use pictovoz_core::{Config, InMemoryVocabulary, RuleEngine, SuggestionConfig};
use pictovoz_server::state::AppState;

/// Test fixture for API testing with a mock remote suggester.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_session_creation() {
///     let fixture = TestFixture::new().await;
///     let response = fixture.post("/api/v1/sessions", json!({})).await;
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    pub router: Router,
    /// Mock remote; unscripted calls fail as unavailable.
    pub remote: Arc<MockRemoteSuggester>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Knobs for the fixture.
pub struct TestConfig {
    pub with_remote: bool,
    pub max_sessions: usize,
    pub suggestions: SuggestionConfig,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            with_remote: true,
            max_sessions: 8,
            suggestions: SuggestionConfig::default(),
        }
    }
}

impl TestFixture {
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    pub async fn with_config(test_config: TestConfig) -> Self {
        let remote = Arc::new(MockRemoteSuggester::new());

        let mut config = Config::default();
        config.server.host = std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST);
        config.server.max_sessions = test_config.max_sessions;
        config.suggestions = test_config.suggestions;

        let vocabulary = InMemoryVocabulary::seed().expect("Failed to load seed vocabulary");
        let injected: Option<Arc<dyn RemoteSuggester>> = if test_config.with_remote {
            Some(Arc::clone(&remote) as Arc<dyn RemoteSuggester>)
        } else {
            None
        };

        let state = Arc::new(AppState::new(
            config,
            Arc::new(vocabulary),
            Arc::new(RuleEngine::default()),
            injected,
        ));

        Self {
            router: pictovoz_server::api::create_router(state),
            remote,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Create a session and return its id.
    pub async fn create_session(&self) -> String {
        let response = self.post("/api/v1/sessions", Value::Null).await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["id"]
            .as_str()
            .expect("session id")
            .to_string()
    }

    /// Append words to a session, returning the last response.
    pub async fn add_words(&self, session_id: &str, ids: &[&str]) -> TestResponse {
        let mut last = None;
        for id in ids {
            let response = self
                .post(
                    &format!("/api/v1/sessions/{}/words", session_id),
                    serde_json::json!({ "word_id": id }),
                )
                .await;
            assert_eq!(response.status, StatusCode::OK, "adding {}", id);
            last = Some(response);
        }
        last.expect("at least one word")
    }

    /// Serve the router on an ephemeral localhost port, for clients that
    /// need a real socket (WebSocket).
    pub async fn serve(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("test server");
        });
        addr
    }

    /// Fetch raw text (for `/metrics`).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = match body {
            Some(Value::Null) | None => Body::empty(),
            Some(json_body) => {
                request_builder = request_builder.header("Content-Type", "application/json");
                Body::from(serde_json::to_vec(&json_body).unwrap())
            }
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
