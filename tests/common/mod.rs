// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use auth_api::config::Config;
use auth_api::db::{Document, DocumentStore, FirestoreDb, MemoryStore};
use auth_api::error::AppError;
use auth_api::routes::create_router;
use auth_api::AppState;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app over a fresh in-memory store.
/// Returns the router, the shared state and the store for inspection.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, MemoryStore) {
    let store = MemoryStore::new();
    let (app, state) = create_test_app_with_store(Arc::new(store.clone()));
    (app, state, store)
}

/// Create a test app over any document store.
#[allow(dead_code)]
pub fn create_test_app_with_store(
    store: Arc<dyn DocumentStore>,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Config::test_default(), store));
    (create_router(state.clone()), state)
}

/// Send a JSON request and return status plus parsed body.
#[allow(dead_code)]
pub async fn send_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    bearer: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

/// Parse a response body as JSON (`Null` when empty).
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}

/// Sign up a user through the API and return the response body.
#[allow(dead_code)]
pub async fn signup(app: &axum::Router, username: &str, email: &str, password: &str) -> Value {
    let (status, body) = send_json(
        app,
        "POST",
        "/auth/signup",
        Some(serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
    body
}

/// Store wrapper that fails operations on selected collections.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct FailingStore {
    pub inner: MemoryStore,
    /// Writes to these collections fail
    pub fail_writes: Vec<&'static str>,
    /// Reads from these collections fail
    pub fail_reads: Vec<&'static str>,
}

impl FailingStore {
    fn check(list: &[&'static str], collection: &str) -> Result<(), AppError> {
        if list.iter().any(|c| *c == collection) {
            Err(AppError::Database(format!("{} unavailable", collection)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn create_document(
        &self,
        collection: &str,
        id: &str,
        data: Document,
    ) -> Result<(), AppError> {
        Self::check(&self.fail_writes, collection)?;
        self.inner.create_document(collection, id, data).await
    }

    async fn create_if_absent(
        &self,
        collection: &str,
        id: &str,
        data: Document,
    ) -> Result<bool, AppError> {
        Self::check(&self.fail_writes, collection)?;
        self.inner.create_if_absent(collection, id, data).await
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, AppError> {
        Self::check(&self.fail_reads, collection)?;
        self.inner.get_document(collection, id).await
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, AppError> {
        Self::check(&self.fail_reads, collection)?;
        self.inner.find_by_field(collection, field, value).await
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: Document,
    ) -> Result<bool, AppError> {
        Self::check(&self.fail_writes, collection)?;
        self.inner.update_document(collection, id, data).await
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), AppError> {
        Self::check(&self.fail_writes, collection)?;
        self.inner.delete_document(collection, id).await
    }
}
