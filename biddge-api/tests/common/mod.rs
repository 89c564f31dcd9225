//! Common test utilities for integration tests
//!
//! Builds the full router over an in-memory store and drives it in-process
//! with `tower::ServiceExt::oneshot`, so no server or database is needed.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use biddge_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig},
};
use biddge_shared::store::MemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Test context containing the router and its backing store
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: Router,
}

/// Status and parsed JSON body of a response
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let app = build_router(AppState::new(store.clone(), test_config()));
        Self { store, app }
    }

    /// Sends a request and parses the JSON body (`Null` when empty)
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        self.request(Method::POST, uri, token, body).await
    }

    /// Registers a user and returns its token
    pub async fn register(&self, name: &str, email: &str, is_creator: bool) -> String {
        let response = self
            .post(
                "/api/auth/register",
                None,
                Some(json!({
                    "name": name,
                    "email": email,
                    "password": "correct horse battery",
                    "is_creator": is_creator,
                })),
            )
            .await;

        assert_eq!(response.status, StatusCode::OK, "register failed: {}", response.body);
        response.body["token"].as_str().unwrap().to_string()
    }

    /// Creates a community as the given user and returns its id
    pub async fn create_community(&self, token: &str, name: &str) -> String {
        let response = self
            .post(
                "/api/communities",
                Some(token),
                Some(json!({
                    "name": name,
                    "description": format!("All about {name}"),
                    "category": "Tech",
                })),
            )
            .await;

        assert_eq!(response.status, StatusCode::OK, "create failed: {}", response.body);
        response.body["id"].as_str().unwrap().to_string()
    }
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["http://localhost:3000".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: "memory://".to_string(),
            name: "biddge_test".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
    }
}
