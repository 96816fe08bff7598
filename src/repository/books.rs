//! Book-specific queries

use super::BooksRepository;
use crate::{
    error::AppResult,
    models::{
        book::{AUTHOR_FIELD, GENRE_FIELD},
        link,
        views::BookSummary,
        Book, Entity,
    },
    store::{Dependents, Filter},
};

/// Books pinning an author in place
pub const BY_AUTHOR: Dependents<'static> = Dependents {
    collection: <Book as Entity>::COLLECTION,
    field: AUTHOR_FIELD,
};

/// Books pinning a genre in place
pub const BY_GENRE: Dependents<'static> = Dependents {
    collection: <Book as Entity>::COLLECTION,
    field: GENRE_FIELD,
};

impl BooksRepository {
    /// All books written by `author_id`
    pub async fn find_by_author(&self, author_id: &str) -> AppResult<Vec<Book>> {
        self.find_by_filter(&Filter::eq(AUTHOR_FIELD, author_id)).await
    }

    /// All books whose genre set contains `genre_id`
    pub async fn find_by_genre(&self, genre_id: &str) -> AppResult<Vec<Book>> {
        self.find_by_filter(&Filter::eq(GENRE_FIELD, genre_id)).await
    }

    /// Title and summary of the books in a genre
    pub async fn summaries_by_genre(&self, genre_id: &str) -> AppResult<Vec<BookSummary>> {
        let mut summaries: Vec<BookSummary> = self
            .find_projected(&Filter::eq(GENRE_FIELD, genre_id), &["title", "summary"])
            .await?;
        for summary in &mut summaries {
            summary.url = link::<Book>(&summary.id);
        }
        Ok(summaries)
    }
}
