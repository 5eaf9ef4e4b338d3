// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process [`DocumentStore`] for local runs and tests.

use crate::db::{with_id, Document, DocumentStore};
use crate::error::AppError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Collections kept in memory, each ordered by document id like Firestore.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<DashMap<String, BTreeMap<String, Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|c| c.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_document(
        &self,
        collection: &str,
        id: &str,
        data: Document,
    ) -> Result<(), AppError> {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    async fn create_if_absent(
        &self,
        collection: &str,
        id: &str,
        data: Document,
    ) -> Result<bool, AppError> {
        // The shard lock is held for the whole check-and-insert.
        let mut docs = self.collections.entry(collection.to_string()).or_default();
        if docs.contains_key(id) {
            return Ok(false);
        }
        docs.insert(id.to_string(), data);
        Ok(true)
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, AppError> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id).cloned())
            .map(|doc| with_id(doc, id)))
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, AppError> {
        Ok(self.collections.get(collection).and_then(|docs| {
            docs.iter()
                .find(|(_, doc)| doc.get(field).and_then(|v| v.as_str()) == Some(value))
                .map(|(id, doc)| with_id(doc.clone(), id))
        }))
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: Document,
    ) -> Result<bool, AppError> {
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(false);
        };
        let Some(existing) = docs.get_mut(id) else {
            return Ok(false);
        };
        existing.extend(data);
        Ok(true)
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), AppError> {
        if let Some(mut docs) = self.collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}
