//! Composite views assembled from more than one collection

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Author, Book, BookInstance, Genre};

/// Home page summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct CatalogCounts {
    pub book_count: u64,
    pub book_instance_count: u64,
    pub book_instance_available_count: u64,
    pub author_count: u64,
    pub genre_count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetail {
    pub author: Author,
    pub books: Vec<Book>,
}

/// Book with its author and genres resolved to full records
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetail {
    pub book: Book,
    pub author: Author,
    pub genres: Vec<Genre>,
    pub instances: Vec<BookInstance>,
}

/// Projection of a book used by genre pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub id: String,
    /// Filled in after projection; never stored
    #[serde(default, skip_deserializing)]
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GenreDetail {
    pub genre: Genre,
    pub books: Vec<BookSummary>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookInstanceDetail {
    pub instance: BookInstance,
    /// None when the referenced book has since been deleted
    pub book_title: Option<String>,
}

/// Row of the book list
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookListing {
    pub id: String,
    pub url: String,
    pub title: String,
    pub author: Option<Author>,
}

/// Row of the book instance list
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookInstanceListing {
    pub instance: BookInstance,
    pub book_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GenreOption {
    pub genre: Genre,
    pub checked: bool,
}

/// Selection lists for the book create/update form
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookForm {
    pub authors: Vec<Author>,
    pub genres: Vec<GenreOption>,
    pub book: Option<Book>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookOption {
    pub id: String,
    pub title: String,
    pub selected: bool,
}

/// Selection list for the book instance create/update form
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookInstanceForm {
    pub books: Vec<BookOption>,
    pub instance: Option<BookInstance>,
}

/// Outcome of a guarded-delete check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DeleteCheck {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocking_books: Vec<Book>,
}

impl DeleteCheck {
    /// Allowed iff nothing blocks.
    pub fn from_blocking(blocking_books: Vec<Book>) -> Self {
        Self {
            allowed: blocking_books.is_empty(),
            blocking_books,
        }
    }
}

/// Result of a guarded delete; a blocked delete is a normal outcome, not a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Blocked { blocking_books: Vec<Book> },
}

impl DeleteOutcome {
    /// Convert a blocked outcome into `AppError::DeleteBlocked` naming `entity`.
    pub fn into_result(self, entity: impl Into<String>) -> crate::error::AppResult<()> {
        match self {
            DeleteOutcome::Deleted => Ok(()),
            DeleteOutcome::Blocked { blocking_books } => {
                Err(crate::error::AppError::DeleteBlocked {
                    entity: entity.into(),
                    blocking_books,
                })
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDeleteView {
    pub author: Author,
    pub check: DeleteCheck,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GenreDeleteView {
    pub genre: Genre,
    pub check: DeleteCheck,
}
