#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use sa_api::{
    auth::jwt::generate_jwt_token,
    config::Environment,
    generation::GenerationGateway,
    router,
    state::{ApiState, AuthConfig},
    store::Store,
};
use sa_engine::ManualClock;
use serde::Deserialize;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test_jwt_secret_minimum_32_characters_long";

/// Nothing listens here, so every generation call takes the fallback path
pub const UNREACHABLE_GATEWAY: &str = "http://127.0.0.1:1";

/// Everything a test needs: the state, the clock driving it, and a client
pub struct TestContext {
    pub state: ApiState,
    pub clock: Arc<ManualClock>,
    pub client: TestClient,
}

impl TestContext {
    pub fn now(&self) -> DateTime<Utc> {
        sa_engine::Clock::now(self.clock.as_ref())
    }
}

/// Test state builder: in-memory store, manual clock, configurable gateway
pub struct TestStateBuilder {
    gateway_url: String,
    start: DateTime<Utc>,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            gateway_url: UNREACHABLE_GATEWAY.to_string(),
            start: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        }
    }

    pub fn gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = url.into();
        self
    }

    pub fn build(self) -> TestContext {
        let clock = Arc::new(ManualClock::new(self.start));
        let state = ApiState::new(
            Store::memory(),
            GenerationGateway::new(self.gateway_url, Duration::from_secs(5)),
            clock.clone(),
            AuthConfig {
                jwt_secret: TEST_JWT_SECRET.to_string(),
            },
            Environment::Development,
        );

        let app = router::router().with_state(state.clone());
        TestContext {
            state,
            clock,
            client: TestClient::new(app),
        }
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A fresh user id and a bearer token for it
pub fn test_user() -> (Uuid, String) {
    let user_id = Uuid::new_v4();
    let token = generate_jwt_token(
        user_id,
        format!("{user_id}@example.com"),
        TEST_JWT_SECRET,
        1,
    )
    .expect("Failed to generate token");
    (user_id, token)
}

/// Serve `router` on an ephemeral port and return its base URL
pub async fn stub_gateway(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub gateway");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Stub gateway failed");
    });
    format!("http://{addr}")
}

/// Helper to make requests to the test app
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Send a request and get the response
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            body: body_bytes.to_vec(),
            headers,
        }
    }

    fn builder(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match token {
            Some(token) => builder.header("authorization", format!("Bearer {token}")),
            None => builder,
        }
    }

    /// Send a GET request without credentials
    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Self::builder("GET", uri, None)
            .body(Body::empty())
            .expect("Failed to build request");
        self.request(request).await
    }

    /// Send a GET request with a bearer token
    pub async fn get_with_auth(&self, uri: &str, token: &str) -> TestResponse {
        let request = Self::builder("GET", uri, Some(token))
            .body(Body::empty())
            .expect("Failed to build authenticated request");
        self.request(request).await
    }

    /// Send a POST request with a bearer token (no body)
    pub async fn post_with_auth(&self, uri: &str, token: &str) -> TestResponse {
        let request = Self::builder("POST", uri, Some(token))
            .body(Body::empty())
            .expect("Failed to build authenticated request");
        self.request(request).await
    }

    /// Send a DELETE request with a bearer token
    pub async fn delete_with_auth(&self, uri: &str, token: &str) -> TestResponse {
        let request = Self::builder("DELETE", uri, Some(token))
            .body(Body::empty())
            .expect("Failed to build authenticated request");
        self.request(request).await
    }

    /// Send a POST request with JSON body and a bearer token
    pub async fn post_json_with_auth<T: serde::Serialize>(
        &self,
        uri: &str,
        body: &T,
        token: &str,
    ) -> TestResponse {
        self.json_with_auth("POST", uri, body, token).await
    }

    /// Send a PUT request with JSON body and a bearer token
    pub async fn put_json_with_auth<T: serde::Serialize>(
        &self,
        uri: &str,
        body: &T,
        token: &str,
    ) -> TestResponse {
        self.json_with_auth("PUT", uri, body, token).await
    }

    async fn json_with_auth<T: serde::Serialize>(
        &self,
        method: &str,
        uri: &str,
        body: &T,
        token: &str,
    ) -> TestResponse {
        let json_body = serde_json::to_string(body).expect("Failed to serialize body");
        let request = Self::builder(method, uri, Some(token))
            .header("content-type", "application/json")
            .body(Body::from(json_body))
            .expect("Failed to build authenticated request");
        self.request(request).await
    }
}

/// Test response wrapper
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub headers: axum::http::HeaderMap,
}

impl TestResponse {
    /// Get response body as string
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Response body is not valid UTF-8")
    }

    /// Parse response body as JSON
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Assert status code
    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
    }

    /// The `error` message of a failed request
    pub fn error(&self) -> String {
        let body: serde_json::Value = self.json();
        body["error"]
            .as_str()
            .expect("Response has no error message")
            .to_string()
    }
}
