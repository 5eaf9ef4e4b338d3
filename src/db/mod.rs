// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer: a keyed document store with named collections.
//!
//! Repositories talk to [`DocumentStore`] so the same code runs against
//! Firestore in production and [`MemoryStore`] locally and in tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Audit copy of the last refresh token issued to a user (keyed by user id)
    pub const REFRESH_TOKENS: &str = "refresh_tokens";
    /// Email reservations guarding uniqueness (keyed by URL-encoded email)
    pub const USER_EMAILS: &str = "user_emails";
}

/// A stored document: a JSON object of field name to value.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Field merged into documents returned by reads.
pub const ID_FIELD: &str = "id";

/// CRUD over a keyed, collection-oriented document backend.
///
/// Reads merge the document key into the returned fields as `id`.
/// "Not found" is reported through `Option`/`bool`, never as an error.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Upsert `data` at `collection/id`, replacing any existing document.
    async fn create_document(&self, collection: &str, id: &str, data: Document)
        -> Result<(), AppError>;

    /// Create `collection/id` only if it does not exist yet.
    ///
    /// Returns `false` (and writes nothing) when the key is already taken.
    async fn create_if_absent(
        &self,
        collection: &str,
        id: &str,
        data: Document,
    ) -> Result<bool, AppError>;

    async fn get_document(&self, collection: &str, id: &str)
        -> Result<Option<Document>, AppError>;

    /// First document (in document-id order) whose `field` equals `value`.
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, AppError>;

    /// Merge `data` into an existing document.
    ///
    /// Returns `false` when the document does not exist.
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: Document,
    ) -> Result<bool, AppError>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), AppError>;
}

/// Attach the document key to its fields, as returned by reads.
pub(crate) fn with_id(mut data: Document, id: &str) -> Document {
    data.insert(
        ID_FIELD.to_string(),
        serde_json::Value::String(id.to_string()),
    );
    data
}

/// Serialize a model into a document body.
pub fn to_document<T: serde::Serialize>(value: &T) -> Result<Document, AppError> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::Internal(anyhow::anyhow!(
            "Model did not serialize to an object"
        ))),
        Err(e) => Err(AppError::Internal(e.into())),
    }
}

/// Deserialize a document (with its merged `id`) into a model.
pub fn from_document<T: serde::de::DeserializeOwned>(doc: Document) -> Result<T, AppError> {
    serde_json::from_value(serde_json::Value::Object(doc))
        .map_err(|e| AppError::Database(format!("Malformed document: {}", e)))
}
