//! In-process tests for the assembled router.
//!
//! Requests go through `Service::call` on the finished `axum::Router`, so no
//! socket is opened. Content comes from a [`MemoryStore`].

use crate::{Config, Environment, FluentRouter, MemoryStore};
use axum::{Router, body::Body, http::Request, response::Response};
use serde_json::{Value, json};
use std::sync::Arc;


/// A store holding one translated section (about) and one collection (social).
pub(crate) fn sample_store() -> MemoryStore {
    MemoryStore::new()
        .with_document(
            "abouts",
            json!({
                "defaultLanguage": "en-US",
                "translations": [{
                    "en-US": { "title": "About me" },
                    "es-ES": { "title": "Sobre mí" }
                }]
            }),
        )
        .with_document(
            "socials",
            json!({ "socials": [{ "name": "github", "url": "https://github.com" }] }),
        )
}

pub(crate) fn config(environment: Environment) -> Config {
    Config::default().with_environment(environment)
}

/// Builds the fully wired router around `store`.
pub(crate) fn create_test_router(config: Config, store: Arc<MemoryStore>) -> Router {
    FluentRouter::new(config, store)
        .expect("Failed to create FluentRouter")
        .setup_middleware()
        .into_router()
}

pub(crate) fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub(crate) fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub(crate) async fn get_body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).expect("response body is not JSON")
}
