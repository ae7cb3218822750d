use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use flashdeck::application::Catalog;
use flashdeck::infrastructure::FallbackStore;
use serde_json::Value;
use tower::ServiceExt;

/// In-process API over a memory-only store
#[allow(dead_code)]
pub struct TestApp {
    pub catalog: Catalog,
    router: Router,
}

#[allow(dead_code)]
impl TestApp {
    pub fn new() -> Self {
        let catalog = Catalog::new(Arc::new(FallbackStore::memory_only()));
        let router = flashdeck::ports::router(catalog.clone());
        Self { catalog, router }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body.to_string())).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body.to_string())).await
    }

    /// Send a raw body, e.g. malformed JSON
    pub async fn post_raw(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body.to_string())).await
    }

    async fn send(&self, method: Method, uri: &str, body: Option<String>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json)
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router should not fail");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}

/// Find a set entry by name in a `/api/sets` response
#[allow(dead_code)]
pub fn set_named<'a>(body: &'a Value, name: &str) -> Option<&'a Value> {
    body["data"]
        .as_array()?
        .iter()
        .find(|set| set["name"] == name)
}
