//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod views;

use serde::{de::DeserializeOwned, Serialize};

// Re-export commonly used types
pub use author::{Author, AuthorInput};
pub use book::{Book, BookInput};
pub use book_instance::{BookInstance, BookInstanceInput, BookInstanceStatus};
pub use genre::{Genre, GenreInput};

/// A catalog record persisted as one document in its own collection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Name of the document collection holding this entity
    const COLLECTION: &'static str;
    /// Path segment used in the canonical link of a record
    const KIND: &'static str;
    /// Fields the store refuses to persist when absent or blank
    const REQUIRED_FIELDS: &'static [&'static str];
    /// Display fields added on serialization and never persisted
    const DERIVED_FIELDS: &'static [&'static str] = &["url"];

    fn id(&self) -> &str;

    /// Canonical link path, e.g. `/catalog/author/{id}`
    fn url(&self) -> String {
        link::<Self>(self.id())
    }
}

/// Canonical link path of the `T` record identified by `id`
pub fn link<T: Entity>(id: &str) -> String {
    format!("/catalog/{}/{}", T::KIND, id)
}

/// Trim a text field coming from a form.
pub(crate) fn trimmed(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}
