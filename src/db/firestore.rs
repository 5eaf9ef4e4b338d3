// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore implementation of [`DocumentStore`].
//!
//! Documents are written and read as untyped JSON objects; the repositories
//! own the mapping to typed models.

use crate::db::{with_id, Document, DocumentStore};
use crate::error::AppError;
use async_trait::async_trait;

/// Metadata fields injected by the `firestore` deserializer.
const FIRESTORE_ID_FIELD: &str = "_firestore_id";
const FIRESTORE_META_PREFIX: &str = "_firestore_";

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator does not accept real credentials; skip the ADC lookup.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client for testing.
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }
}

/// Replace the deserializer's metadata fields with a plain `id`.
fn normalize_document(mut doc: Document, fallback_id: &str) -> Document {
    let id = doc
        .get(FIRESTORE_ID_FIELD)
        .and_then(|v| v.as_str())
        .unwrap_or(fallback_id)
        .to_string();
    doc.retain(|key, _| !key.starts_with(FIRESTORE_META_PREFIX));
    with_id(doc, &id)
}

#[async_trait]
impl DocumentStore for FirestoreDb {
    async fn create_document(
        &self,
        collection: &str,
        id: &str,
        data: Document,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .object(&data)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(collection, id, "Document written");
        Ok(())
    }

    async fn create_if_absent(
        &self,
        collection: &str,
        id: &str,
        data: Document,
    ) -> Result<bool, AppError> {
        // Firestore `create` fails with ALREADY_EXISTS if the key is taken.
        let result: firestore::FirestoreResult<Document> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collection)
            .document_id(id)
            .object(&data)
            .execute()
            .await;

        match result {
            Ok(_) => {
                tracing::debug!(collection, id, "Document created");
                Ok(true)
            }
            Err(firestore::errors::FirestoreError::DataConflictError(_)) => Ok(false),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, AppError> {
        let doc: Option<Document> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(doc.map(|d| normalize_document(d, id)))
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, AppError> {
        let field = field.to_string();
        let value = value.to_string();

        let docs: Vec<Document> = self
            .get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(move |q| q.for_all([q.field(field.as_str()).eq(value.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(docs.into_iter().next().map(|d| normalize_document(d, "")))
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: Document,
    ) -> Result<bool, AppError> {
        // Firestore upserts on update; check existence first so a merge never
        // resurrects a deleted document.
        if self.get_document(collection, id).await?.is_none() {
            return Ok(false);
        }

        let field_mask: Vec<String> = data.keys().cloned().collect();

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(field_mask)
            .in_col(collection)
            .document_id(id)
            .object(&data)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(collection, id, "Document updated");
        Ok(true)
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(collection, id, "Document deleted");
        Ok(())
    }
}
