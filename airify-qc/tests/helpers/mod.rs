//! Shared fixtures for airify-qc integration tests

#![allow(dead_code)]

use airify_qc::api::{create_router, AppContext, ControlInfo};
use airify_qc::catalog::{Catalog, TrackDescriptor};
use airify_qc::queue::QueueEngine;
use airify_qc::SharedState;
use axum::body::Body;
use axum::http::StatusCode;
use chrono::Utc;
use http::{Method, Request};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub fn descriptor(locator: &str, duration_ms: u64) -> TrackDescriptor {
    TrackDescriptor {
        locator: locator.to_string(),
        title: format!("Song {}", locator),
        artist: format!("Band {}", locator),
        duration_ms,
        available: true,
    }
}

/// Queue engine over tracks of the given ids, each `duration_ms` long
pub fn engine(ids: &[&str], duration_ms: u64) -> Arc<QueueEngine> {
    let catalog = Catalog::from_descriptors(ids.iter().map(|id| descriptor(id, duration_ms)).collect())
        .expect("valid catalog");
    Arc::new(QueueEngine::initialize(Arc::new(catalog)))
}

pub struct TestApp {
    pub router: axum::Router,
    pub queue: Arc<QueueEngine>,
    pub state: Arc<SharedState>,
}

pub fn test_app(ids: &[&str]) -> TestApp {
    let queue = engine(ids, 180_000);
    let state = Arc::new(SharedState::new());
    let ctx = AppContext {
        queue: Arc::clone(&queue),
        state: Arc::clone(&state),
        info: Arc::new(ControlInfo {
            playlist_uri: "local:test".to_string(),
            playlist_name: "Test Playlist".to_string(),
            session_user: "alice".to_string(),
            session_opened_at: Utc::now(),
            device: "localhost:5000".to_string(),
        }),
    };

    TestApp {
        router: create_router(ctx),
        queue,
        state,
    }
}

/// Fire one request at the router and decode the JSON body, if any
pub async fn make_request(app: &axum::Router, method: Method, path: &str) -> (StatusCode, Option<Value>) {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    let body = if bytes.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&bytes).unwrap())
    };

    (status, body)
}

/// Queue order as plain strings
pub async fn order(queue: &QueueEngine) -> Vec<String> {
    queue.order().await.iter().map(|id| id.to_string()).collect()
}
