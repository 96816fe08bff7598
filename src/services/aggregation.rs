//! Composite views joined in memory from concurrent fetches
//!
//! Every sub-fetch of one view is issued up front and awaited together; the first
//! failure aborts the whole view so callers never see a partial aggregate.

use std::collections::HashMap;

use futures::future::try_join_all;

use crate::{
    error::{AppError, AppResult},
    models::{
        views::{
            AuthorDetail, BookDetail, BookForm, BookInstanceDetail, BookInstanceForm,
            BookInstanceListing, BookListing, BookOption, CatalogCounts, GenreDetail,
            GenreOption,
        },
        Author, BookInstanceStatus, Entity, Genre,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AggregationService {
    repository: Repository,
}

impl AggregationService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Independent counts for the home page
    pub async fn counts(&self) -> AppResult<CatalogCounts> {
        let repo = &self.repository;
        let (
            book_count,
            book_instance_count,
            book_instance_available_count,
            author_count,
            genre_count,
        ) = tokio::try_join!(
            repo.books.count(None),
            repo.book_instances.count(None),
            repo.book_instances
                .count_with_status(BookInstanceStatus::Available),
            repo.authors.count(None),
            repo.genres.count(None),
        )?;

        Ok(CatalogCounts {
            book_count,
            book_instance_count,
            book_instance_available_count,
            author_count,
            genre_count,
        })
    }

    /// Author plus every book referencing it
    pub async fn author_detail(&self, id: &str) -> AppResult<AuthorDetail> {
        let (author, books) = tokio::try_join!(
            self.repository.authors.find_by_id(id),
            self.repository.books.find_by_author(id),
        )?;
        Ok(AuthorDetail { author, books })
    }

    /// Book with author and genres resolved, plus its copies
    pub async fn book_detail(&self, id: &str) -> AppResult<BookDetail> {
        let (book, instances) = tokio::try_join!(
            self.repository.books.find_by_id(id),
            self.repository.book_instances.find_by_book(id),
        )?;
        let (author, genres) = tokio::try_join!(
            self.resolve_author(&book.author),
            self.resolve_genres(&book.genre),
        )?;
        Ok(BookDetail {
            book,
            author,
            genres,
            instances,
        })
    }

    /// Genre plus the title and summary of every book carrying it
    pub async fn genre_detail(&self, id: &str) -> AppResult<GenreDetail> {
        let (genre, books) = tokio::try_join!(
            self.repository.genres.find_by_id(id),
            self.repository.books.summaries_by_genre(id),
        )?;
        Ok(GenreDetail { genre, books })
    }

    pub async fn book_instance_detail(&self, id: &str) -> AppResult<BookInstanceDetail> {
        let instance = self.repository.book_instances.find_by_id(id).await?;
        let book_title = self
            .repository
            .books
            .find_optional(&instance.book)
            .await?
            .map(|b| b.title);
        Ok(BookInstanceDetail {
            instance,
            book_title,
        })
    }

    /// All books by title, each with its author
    pub async fn book_list(&self) -> AppResult<Vec<BookListing>> {
        let (books, authors) = tokio::try_join!(
            self.repository.books.find_all(Some("title")),
            self.repository.authors.find_all(None),
        )?;
        let authors: HashMap<String, Author> =
            authors.into_iter().map(|a| (a.id.clone(), a)).collect();

        Ok(books
            .into_iter()
            .map(|b| BookListing {
                author: authors.get(&b.author).cloned(),
                url: b.url(),
                id: b.id,
                title: b.title,
            })
            .collect())
    }

    /// All copies with the title of their book
    pub async fn book_instance_list(&self) -> AppResult<Vec<BookInstanceListing>> {
        let (instances, books) = tokio::try_join!(
            self.repository.book_instances.find_all(None),
            self.repository.books.find_all(None),
        )?;
        let titles: HashMap<String, String> =
            books.into_iter().map(|b| (b.id, b.title)).collect();

        Ok(instances
            .into_iter()
            .map(|instance| BookInstanceListing {
                book_title: titles.get(&instance.book).cloned(),
                instance,
            })
            .collect())
    }

    /// Selection lists for the book form; genres of `book_id` come back checked.
    pub async fn book_form(&self, book_id: Option<&str>) -> AppResult<BookForm> {
        let (authors, genres, book) = tokio::try_join!(
            self.repository.authors.find_all(Some("family_name")),
            self.repository.genres.find_all(Some("name")),
            async {
                match book_id {
                    Some(id) => self.repository.books.find_by_id(id).await.map(Some),
                    None => Ok(None),
                }
            },
        )?;

        let genres = genres
            .into_iter()
            .map(|genre| GenreOption {
                checked: book.as_ref().is_some_and(|b| b.has_genre(&genre.id)),
                genre,
            })
            .collect();

        Ok(BookForm {
            authors,
            genres,
            book,
        })
    }

    /// Selection list for the copy form; the book of `instance_id` comes back selected.
    pub async fn book_instance_form(&self, instance_id: Option<&str>) -> AppResult<BookInstanceForm> {
        let (books, instance) = tokio::try_join!(
            self.repository.books.find_all(Some("title")),
            async {
                match instance_id {
                    Some(id) => self.repository.book_instances.find_by_id(id).await.map(Some),
                    None => Ok(None),
                }
            },
        )?;

        let books = books
            .into_iter()
            .map(|b| BookOption {
                selected: instance.as_ref().is_some_and(|i| i.book == b.id),
                id: b.id,
                title: b.title,
            })
            .collect();

        Ok(BookInstanceForm { books, instance })
    }

    /// Load the author a record points at, failing with `DanglingReference` when it is gone.
    pub async fn resolve_author(&self, author_id: &str) -> AppResult<Author> {
        self.repository
            .authors
            .find_optional(author_id)
            .await?
            .ok_or_else(|| {
                AppError::DanglingReference(format!("Author {} does not exist", author_id))
            })
    }

    /// Load every referenced genre concurrently, in the given order.
    pub async fn resolve_genres(&self, genre_ids: &[String]) -> AppResult<Vec<Genre>> {
        let found = try_join_all(
            genre_ids
                .iter()
                .map(|id| self.repository.genres.find_optional(id)),
        )
        .await?;

        genre_ids
            .iter()
            .zip(found)
            .map(|(id, genre)| {
                genre.ok_or_else(|| {
                    AppError::DanglingReference(format!("Genre {} does not exist", id))
                })
            })
            .collect()
    }

    pub async fn resolve_book_exists(&self, book_id: &str) -> AppResult<()> {
        match self.repository.books.find_optional(book_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::DanglingReference(format!(
                "Book {} does not exist",
                book_id
            ))),
        }
    }
}
