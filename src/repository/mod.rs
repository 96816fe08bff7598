//! Repository layer: typed access to the document collections

pub mod book_instances;
pub mod books;
pub mod genres;

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult, FieldError, StoreError},
    models::{Author, Book, BookInstance, Entity, Genre},
    store::{ConditionalDelete, Dependents, Filter, SharedStore},
};

/// Same operation set for every entity, backed by its own collection.
pub struct EntityRepository<T> {
    store: SharedStore,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for EntityRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

fn decode<D: DeserializeOwned>(document: Value) -> AppResult<D> {
    serde_json::from_value(document).map_err(|e| AppError::Store(StoreError::from(e)))
}

fn decode_all<D: DeserializeOwned>(documents: Vec<Value>) -> AppResult<Vec<D>> {
    documents.into_iter().map(decode).collect()
}

impl<T: Entity> EntityRepository<T> {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub async fn find_all(&self, sort: Option<&str>) -> AppResult<Vec<T>> {
        let documents = self.store.find_all(T::COLLECTION, sort).await?;
        decode_all(documents)
    }

    pub async fn find_optional(&self, id: &str) -> AppResult<Option<T>> {
        self.store
            .find_by_id(T::COLLECTION, id)
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<T> {
        self.find_optional(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} with id {} not found", T::KIND, id)))
    }

    pub async fn find_by_filter(&self, filter: &Filter) -> AppResult<Vec<T>> {
        let documents = self.store.find_by_filter(T::COLLECTION, filter, None).await?;
        decode_all(documents)
    }

    /// Like [`find_by_filter`](Self::find_by_filter) but only loads `fields` into a lighter row type.
    pub async fn find_projected<P: DeserializeOwned>(
        &self,
        filter: &Filter,
        fields: &[&str],
    ) -> AppResult<Vec<P>> {
        let documents = self
            .store
            .find_by_filter(T::COLLECTION, filter, Some(fields))
            .await?;
        decode_all(documents)
    }

    pub async fn count(&self, filter: Option<&Filter>) -> AppResult<u64> {
        Ok(self.store.count(T::COLLECTION, filter).await?)
    }

    /// Persist a new record; the store assigns the identifier when `entity.id()` is empty.
    pub async fn insert(&self, entity: &T) -> AppResult<T> {
        let document = Self::encode(entity)?;
        let stored = self.store.insert(T::COLLECTION, document).await?;
        decode(stored)
    }

    /// Full-document replace; the identifier never changes.
    pub async fn update(&self, id: &str, entity: &T) -> AppResult<T> {
        let document = Self::encode(entity)?;
        self.store
            .replace(T::COLLECTION, id, document)
            .await?
            .map(decode)
            .transpose()?
            .ok_or_else(|| AppError::NotFound(format!("{} with id {} not found", T::KIND, id)))
    }

    /// Unconditional delete
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if self.store.delete(T::COLLECTION, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("{} with id {} not found", T::KIND, id)))
        }
    }

    /// Atomic delete-if-no-dependent, with blocking dependents decoded as books.
    pub async fn delete_unreferenced(
        &self,
        id: &str,
        dependents: Dependents<'_>,
    ) -> AppResult<Result<(), Vec<Book>>> {
        match self
            .store
            .delete_unreferenced(T::COLLECTION, id, dependents)
            .await?
        {
            ConditionalDelete::Deleted => Ok(Ok(())),
            ConditionalDelete::Blocked(documents) => Ok(Err(decode_all(documents)?)),
            ConditionalDelete::NotFound => Err(AppError::NotFound(format!(
                "{} with id {} not found",
                T::KIND,
                id
            ))),
        }
    }

    /// Serialize without display fields and refuse documents missing a required field.
    fn encode(entity: &T) -> AppResult<Value> {
        let mut document = serde_json::to_value(entity).map_err(StoreError::from)?;
        if let Some(object) = document.as_object_mut() {
            for field in T::DERIVED_FIELDS {
                object.remove(*field);
            }
        }
        let missing: Vec<FieldError> = T::REQUIRED_FIELDS
            .iter()
            .filter(|field| match document.get(**field) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            })
            .map(|field| FieldError::new(*field, format!("{} is required", field)))
            .collect();
        if missing.is_empty() {
            Ok(document)
        } else {
            Err(AppError::Validation(missing))
        }
    }
}

pub type AuthorsRepository = EntityRepository<Author>;
pub type BooksRepository = EntityRepository<Book>;
pub type GenresRepository = EntityRepository<Genre>;
pub type BookInstancesRepository = EntityRepository<BookInstance>;

/// Main repository struct holding one repository per collection
#[derive(Clone)]
pub struct Repository {
    pub authors: AuthorsRepository,
    pub books: BooksRepository,
    pub genres: GenresRepository,
    pub book_instances: BookInstancesRepository,
}

impl Repository {
    /// Create a new repository over the given document store
    pub fn new(store: SharedStore) -> Self {
        Self {
            authors: EntityRepository::new(store.clone()),
            books: EntityRepository::new(store.clone()),
            genres: EntityRepository::new(store.clone()),
            book_instances: EntityRepository::new(store),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::{DocumentStore, MemoryStore};

    fn repository() -> Repository {
        Repository::new(Arc::new(MemoryStore::new()))
    }

    fn author(family_name: &str) -> Author {
        Author {
            id: String::new(),
            first_name: "Test".into(),
            family_name: family_name.into(),
            date_of_birth: None,
            date_of_death: None,
        }
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let repo = repository();
        let stored = repo.authors.insert(&author("Austen")).await.unwrap();
        assert!(!stored.id.is_empty());

        let found = repo.authors.find_by_id(&stored.id).await.unwrap();
        assert_eq!(found, stored);
    }

    #[tokio::test]
    async fn test_insert_rejects_missing_required_field() {
        let repo = repository();
        let err = repo.authors.insert(&author("")).await.unwrap_err();
        match err {
            AppError::Validation(fields) => assert_eq!(fields[0].field, "family_name"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(repo.authors.count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_display_fields_are_not_persisted() {
        let store = Arc::new(MemoryStore::new());
        let repo = Repository::new(store.clone());
        let mut tolkien = author("Tolkien");
        tolkien.date_of_birth = chrono::NaiveDate::from_ymd_opt(1892, 1, 3);
        let stored = repo.authors.insert(&tolkien).await.unwrap();
        repo.authors.update(&stored.id, &stored).await.unwrap();

        let document = store
            .find_by_id(<Author as Entity>::COLLECTION, &stored.id)
            .await
            .unwrap()
            .unwrap();
        for field in <Author as Entity>::DERIVED_FIELDS {
            assert!(document.get(*field).is_none(), "{} was persisted", field);
        }
        assert_eq!(document["family_name"], "Tolkien");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_are_not_found() {
        let repo = repository();
        let mut missing = author("Brontë");
        missing.id = "ghost".into();
        assert!(matches!(
            repo.authors.update("ghost", &missing).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            repo.authors.delete("ghost").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            repo.authors.find_by_id("ghost").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_find_all_sorted() {
        let repo = repository();
        for name in ["Woolf", "Austen", "Morrison"] {
            repo.authors.insert(&author(name)).await.unwrap();
        }
        let names: Vec<String> = repo
            .authors
            .find_all(Some("family_name"))
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.family_name)
            .collect();
        assert_eq!(names, vec!["Austen", "Morrison", "Woolf"]);
    }
}
