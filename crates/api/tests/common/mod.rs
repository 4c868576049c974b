//! Common test utilities for integration tests.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot` against
//! an in-memory survey store, so these tests need no database.

// Not every integration test binary uses every helper.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use domain::services::{InMemorySurveyStore, SurveyService, SurveyStore};
use serde_json::Value;
use shared::jwt::JwtConfig;
use std::sync::Arc;
use survey_api::{
    app::{create_app, create_app_with_service},
    config::{
        AuthConfig, Config, DatabaseConfig, LimitsConfig, LoggingConfig, SecurityConfig,
        ServerConfig,
    },
};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";
pub const PUBLIC_BASE_URL: &str = "https://surveys.test";

/// Test configuration with rate limiting disabled.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Use random port
            request_timeout_secs: 30,
            max_body_size: 1_048_576,
            public_base_url: PUBLIC_BASE_URL.to_string(),
        },
        database: DatabaseConfig {
            url: "postgres://unused@localhost/unused".to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
            public_rate_limit_per_minute: 0, // Disable rate limiting for tests
        },
        limits: LimitsConfig {
            max_questions_per_survey: 100,
            max_options_per_question: 50,
            max_title_length: 200,
            max_answer_length: 5000,
        },
        auth: AuthConfig {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            audience: None,
            leeway_secs: 30,
        },
    }
}

/// Application wired to a fresh in-memory store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemorySurveyStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(InMemorySurveyStore::new());
        let router = create_app(config, store.clone()).expect("Failed to build app");
        Self { router, store }
    }

    /// Uses a store whose every call fails.
    pub fn failing() -> Self {
        let store = Arc::new(InMemorySurveyStore::failing());
        let dyn_store: Arc<dyn SurveyStore> = store.clone();
        let service = SurveyService::new(dyn_store, test_config().limits.schema_limits());
        let router = create_app_with_service(test_config(), service).expect("Failed to build app");
        Self { router, store }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn send_raw(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// A survey owner with a valid access token.
pub struct TestOwner {
    pub user_id: Uuid,
    pub access_token: String,
}

impl TestOwner {
    pub fn new() -> Self {
        let user_id = Uuid::new_v4();
        let jwt = JwtConfig::from_secret(TEST_JWT_SECRET, None, 30).unwrap();
        let access_token = jwt.issue_access_token(user_id, 3600).unwrap();
        Self {
            user_id,
            access_token,
        }
    }
}

impl Default for TestOwner {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            panic!(
                "Failed to parse response body: {:?}",
                String::from_utf8_lossy(&bytes)
            )
        })
    }
}

pub fn owner_request(
    method: Method,
    uri: &str,
    owner: &TestOwner,
    body: Option<Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::AUTHORIZATION,
            format!("Bearer {}", owner.access_token),
        );
    with_json_body(builder, body)
}

pub fn public_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    with_json_body(Request::builder().method(method).uri(uri), body)
}

fn with_json_body(builder: axum::http::request::Builder, body: Option<Value>) -> Request<Body> {
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// A three-question survey definition: required rating, optional
/// multiple choice, optional yes/no.
pub fn feedback_survey_body() -> Value {
    serde_json::json!({
        "title": "Customer feedback",
        "description": "Tell us how we did",
        "questions": [
            { "id": "q1", "prompt": "How satisfied are you?", "type": "rating", "required": true },
            {
                "id": "q2",
                "prompt": "Which plan are you on?",
                "type": "multiple-choice",
                "options": ["Free", "Pro", "Team"]
            },
            { "id": "q3", "prompt": "Would you recommend us?", "type": "yes-no" }
        ]
    })
}

/// Creates and publishes a survey, returning `(survey_id, share_token)`.
pub async fn create_published_survey(
    app: &TestApp,
    owner: &TestOwner,
    body: Value,
) -> (String, String) {
    let (status, created) = app
        .send(owner_request(Method::POST, "/api/v1/surveys", owner, Some(body)))
        .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", created);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, published) = app
        .send(owner_request(
            Method::POST,
            &format!("/api/v1/surveys/{}/publish", id),
            owner,
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "publish failed: {}", published);
    let token = published["share_token"].as_str().unwrap().to_string();

    (id, token)
}

/// Submits a response and returns the status and body.
pub async fn submit(app: &TestApp, survey_id: &str, answers: Value) -> (StatusCode, Value) {
    app.send(public_request(
        Method::POST,
        "/api/v1/responses",
        Some(serde_json::json!({ "survey_id": survey_id, "answers": answers })),
    ))
    .await
}
