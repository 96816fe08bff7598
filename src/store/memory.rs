//! In-process document store

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{
    assign_id, pin_id, project, ConditionalDelete, Dependents, DocumentStore, Filter,
};
use crate::error::{StoreError, StoreResult};

type Collection = IndexMap<String, Value>;

/// Collections kept in insertion order behind a single lock.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_key<'a>(document: &'a Value, field: &str) -> Option<&'a str> {
    document.get(field).and_then(Value::as_str)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_all(&self, collection: &str, sort: Option<&str>) -> StoreResult<Vec<Value>> {
        let collections = self.collections.read().await;
        let mut documents: Vec<Value> = collections
            .get(collection)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default();
        if let Some(field) = sort {
            documents.sort_by(|a, b| sort_key(a, field).cmp(&sort_key(b, field)));
        }
        Ok(documents)
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|c| c.get(id)).cloned())
    }

    async fn find_by_filter(
        &self,
        collection: &str,
        filter: &Filter,
        projection: Option<&[&str]>,
    ) -> StoreResult<Vec<Value>> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(documents
            .values()
            .filter(|d| filter.matches(d))
            .map(|d| match projection {
                Some(fields) => project(d, fields),
                None => d.clone(),
            })
            .collect())
    }

    async fn insert(&self, collection: &str, mut document: Value) -> StoreResult<Value> {
        let id = assign_id(&mut document)?;
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();
        if documents.contains_key(&id) {
            return Err(StoreError::Backend(format!(
                "duplicate id {} in {}",
                id, collection
            )));
        }
        documents.insert(id, document.clone());
        Ok(document)
    }

    async fn replace(
        &self,
        collection: &str,
        id: &str,
        mut document: Value,
    ) -> StoreResult<Option<Value>> {
        pin_id(&mut document, id)?;
        let mut collections = self.collections.write().await;
        let Some(slot) = collections.get_mut(collection).and_then(|c| c.get_mut(id)) else {
            return Ok(None);
        };
        *slot = document.clone();
        Ok(Some(document))
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .and_then(|c| c.shift_remove(id))
            .is_some())
    }

    async fn count(&self, collection: &str, filter: Option<&Filter>) -> StoreResult<u64> {
        let collections = self.collections.read().await;
        let count = collections
            .get(collection)
            .map(|c| match filter {
                Some(f) => c.values().filter(|d| f.matches(d)).count(),
                None => c.len(),
            })
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn delete_unreferenced(
        &self,
        collection: &str,
        id: &str,
        dependents: Dependents<'_>,
    ) -> StoreResult<ConditionalDelete> {
        // One write guard covers both the dependents scan and the removal.
        let mut collections = self.collections.write().await;
        let exists = collections
            .get(collection)
            .is_some_and(|c| c.contains_key(id));
        if !exists {
            return Ok(ConditionalDelete::NotFound);
        }

        let filter = dependents.filter(id);
        let blocking: Vec<Value> = collections
            .get(dependents.collection)
            .map(|c| c.values().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default();
        if !blocking.is_empty() {
            return Ok(ConditionalDelete::Blocked(blocking));
        }

        if let Some(c) = collections.get_mut(collection) {
            c.shift_remove(id);
        }
        Ok(ConditionalDelete::Deleted)
    }
}
