//! Shared helpers for HTTP route tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use calnotify_domain::Config;
use calnotify_lib::{build_router, AppContext};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Router over a fresh temporary database, scheduler not started.
pub struct TestApp {
    pub ctx: Arc<AppContext>,
    pub router: Router,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(mut config: Config) -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        config.database.path = temp_dir.path().join("api-test.db").to_string_lossy().into_owned();
        config.database.pool_size = 2;
        config.scheduler.enabled = false;

        let ctx = Arc::new(AppContext::new(config).expect("context should initialise"));
        let router = build_router(Arc::clone(&ctx));
        Self { ctx, router, _temp_dir: temp_dir }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request should build"))
            .await
            .expect("router should respond");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.expect("body should read");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }
}
