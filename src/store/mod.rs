//! Document store abstraction
//!
//! The catalog keeps one collection of JSON documents per entity. Backends only
//! need single-document atomicity and single-field equality filters.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

/// Key under which every document carries its identifier
pub const ID_FIELD: &str = "id";

pub type SharedStore = Arc<dyn DocumentStore>;

/// Single-field equality match.
///
/// When the field holds an array the filter matches if any element equals the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub value: String,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, document: &Value) -> bool {
        match document.get(&self.field) {
            Some(Value::String(s)) => *s == self.value,
            Some(Value::Array(items)) => items
                .iter()
                .any(|v| v.as_str() == Some(self.value.as_str())),
            _ => false,
        }
    }
}

/// Collection and foreign-key field of documents that pin a record in place
#[derive(Debug, Clone, Copy)]
pub struct Dependents<'a> {
    pub collection: &'a str,
    pub field: &'a str,
}

impl Dependents<'_> {
    pub fn filter(&self, id: &str) -> Filter {
        Filter::eq(self.field, id)
    }
}

/// Result of an atomic delete-if-unreferenced
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionalDelete {
    Deleted,
    Blocked(Vec<Value>),
    NotFound,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of a collection, ascending on `sort` when given, insertion order otherwise.
    async fn find_all(&self, collection: &str, sort: Option<&str>) -> StoreResult<Vec<Value>>;

    async fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Value>>;

    /// Documents matching `filter`, reduced to `projection` (plus `id`) when given.
    async fn find_by_filter(
        &self,
        collection: &str,
        filter: &Filter,
        projection: Option<&[&str]>,
    ) -> StoreResult<Vec<Value>>;

    /// Persist a new document, assigning an identifier if it has none.
    async fn insert(&self, collection: &str, document: Value) -> StoreResult<Value>;

    /// Replace the whole document stored under `id`. `None` when no such document exists.
    async fn replace(&self, collection: &str, id: &str, document: Value)
        -> StoreResult<Option<Value>>;

    /// Returns whether a document was removed.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool>;

    async fn count(&self, collection: &str, filter: Option<&Filter>) -> StoreResult<u64>;

    /// Delete `id` only if no document in `dependents` references it, as one atomic step.
    async fn delete_unreferenced(
        &self,
        collection: &str,
        id: &str,
        dependents: Dependents<'_>,
    ) -> StoreResult<ConditionalDelete>;
}

/// Ensure `document` is an object carrying an identifier; returns the identifier.
pub(crate) fn assign_id(document: &mut Value) -> StoreResult<String> {
    let object = document
        .as_object_mut()
        .ok_or_else(|| StoreError::Backend("document must be a JSON object".to_string()))?;
    match object.get(ID_FIELD).and_then(Value::as_str) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => {
            let id = uuid::Uuid::new_v4().to_string();
            object.insert(ID_FIELD.to_string(), Value::String(id.clone()));
            Ok(id)
        }
    }
}

/// Force the identifier of a replacement document to `id`.
pub(crate) fn pin_id(document: &mut Value, id: &str) -> StoreResult<()> {
    let object = document
        .as_object_mut()
        .ok_or_else(|| StoreError::Backend("document must be a JSON object".to_string()))?;
    object.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    Ok(())
}

/// Keep only the projected fields and the identifier.
pub(crate) fn project(document: &Value, fields: &[&str]) -> Value {
    let mut projected = Map::new();
    if let Some(object) = document.as_object() {
        for (key, value) in object {
            if key == ID_FIELD || fields.contains(&key.as_str()) {
                projected.insert(key.clone(), value.clone());
            }
        }
    }
    Value::Object(projected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_matches_scalar_and_array() {
        let book = json!({"id": "b1", "author": "a1", "genre": ["g1", "g2"]});
        assert!(Filter::eq("author", "a1").matches(&book));
        assert!(!Filter::eq("author", "a2").matches(&book));
        assert!(Filter::eq("genre", "g2").matches(&book));
        assert!(!Filter::eq("genre", "g3").matches(&book));
        assert!(!Filter::eq("missing", "a1").matches(&book));
    }

    #[test]
    fn test_assign_id_keeps_supplied() {
        let mut doc = json!({"id": "a1", "family_name": "Tolkien"});
        assert_eq!(assign_id(&mut doc).unwrap(), "a1");

        let mut doc = json!({"family_name": "Tolkien"});
        let id = assign_id(&mut doc).unwrap();
        assert!(!id.is_empty());
        assert_eq!(doc["id"], id);

        assert!(assign_id(&mut json!("scalar")).is_err());
    }

    #[test]
    fn test_project_keeps_id() {
        let doc = json!({"id": "b1", "title": "Dune", "summary": "Spice", "isbn": "1"});
        assert_eq!(
            project(&doc, &["title"]),
            json!({"id": "b1", "title": "Dune"})
        );
    }
}
