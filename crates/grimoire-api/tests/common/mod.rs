//! Shared helpers for driving the router in-process against the memory store.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use grimoire_api::config::{ApiConfig, CategoryDeletePolicy};
use grimoire_api::{build_router, parse_allowed_origins, AppState};
use grimoire_db::MemoryStore;

pub struct TestApp {
    pub router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(ApiConfig::default())
    }

    pub fn with_policy(policy: CategoryDeletePolicy) -> Self {
        Self::with_config(ApiConfig {
            delete_policy: policy,
            ..ApiConfig::default()
        })
    }

    pub fn with_config(config: ApiConfig) -> Self {
        let state = AppState::new(MemoryStore::new().store(), &config);
        let router = build_router(state, parse_allowed_origins(&config.allowed_origins));
        Self { router }
    }

    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn raw(&self, method: &str, uri: &str, body: &'static str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.request("PUT", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request("DELETE", uri, None).await
    }

    /// Create a category and return its JSON.
    pub async fn create_category(&self, title: &str, keywords: &[&str]) -> Value {
        let response = self
            .post(
                "/api/categorys",
                serde_json::json!({ "title": title, "keywords": keywords }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body
    }

    /// Create a wizard under `category_id` and return its JSON.
    pub async fn create_wizard(&self, name: &str, category_id: &str) -> Value {
        let response = self
            .post(
                "/api/wizards",
                serde_json::json!({
                    "name": name,
                    "content": "lorem ipsum dolor sit amet",
                    "categoryId": category_id,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body
    }
}

/// The `id` field of a JSON entity.
pub fn id_of(entity: &Value) -> String {
    entity["id"].as_str().unwrap().to_string()
}

/// The `wizardIds` of a category as strings.
pub fn wizard_ids(category: &Value) -> Vec<String> {
    category["wizardIds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}
