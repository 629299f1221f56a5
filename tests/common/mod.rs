//! Common test utilities for integration tests
//!
//! Provides an in-memory application and request helpers shared across
//! the integration test files.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

use attainment::adapters::http::{build_router, AppState};
use attainment::adapters::sqlite::create_migrated_test_pool;
use attainment::{MappingMode, PriorityWeights};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Router and pool over a fresh in-memory database.
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_mode(MappingMode::default()).await
    }

    pub async fn with_mode(mode: MappingMode) -> Self {
        let pool = create_migrated_test_pool().await.expect("test pool");
        let state = AppState::from_pool(pool.clone(), PriorityWeights::default(), mode);
        Self {
            router: build_router(state, false),
            pool,
        }
    }

    /// Send a request and return the status with the body parsed as JSON
    /// (or as a JSON string when the body is not JSON).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    pub async fn get(&self, uri: &str, headers: &[(&str, &str)]) -> (StatusCode, Value) {
        self.send(Method::GET, uri, headers, None).await
    }

    pub async fn post(&self, uri: &str, headers: &[(&str, &str)], body: &str) -> (StatusCode, Value) {
        self.send(Method::POST, uri, headers, Some(body)).await
    }

    /// POST and return `insertedId`, asserting 201.
    pub async fn create(&self, uri: &str, headers: &[(&str, &str)], body: &str) -> i64 {
        let (status, value) = self.post(uri, headers, body).await;
        assert_eq!(status, StatusCode::CREATED, "POST {uri} failed: {value}");
        value["insertedId"].as_i64().expect("insertedId")
    }
}

pub const MATH_Q1: [(&str, &str); 3] = [("subject", "math"), ("year", "2024"), ("quarter", "Q1")];
pub const COHORT_5A: [(&str, &str); 3] = [("year", "2024"), ("class", "5"), ("section", "A")];
pub const MAPPING_5A: [(&str, &str); 5] = [
    ("subject", "math"),
    ("quarter", "Q1"),
    ("year", "2024"),
    ("class", "5"),
    ("section", "A"),
];

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
