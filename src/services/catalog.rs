//! Catalog management service
//!
//! Single entry point for request handlers: every list, detail, create, update and
//! delete use case for authors, books, genres and book instances.

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        views::{
            AuthorDeleteView, AuthorDetail, BookDetail, BookForm, BookInstanceDetail,
            BookInstanceForm, BookInstanceListing, BookListing, CatalogCounts, DeleteCheck,
            DeleteOutcome, GenreDeleteView, GenreDetail,
        },
        Author, AuthorInput, Book, BookInput, BookInstance, BookInstanceInput, Genre, GenreInput,
    },
    repository::Repository,
    services::{aggregation::AggregationService, consistency::ConsistencyEngine},
};

/// Reject input that skipped upstream validation.
fn validated<I: Validate>(input: I) -> AppResult<I> {
    input.validate()?;
    Ok(input)
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    aggregation: AggregationService,
    consistency: ConsistencyEngine,
}

impl CatalogService {
    pub fn new(repository: Repository, strict_delete: bool) -> Self {
        Self {
            aggregation: AggregationService::new(repository.clone()),
            consistency: ConsistencyEngine::new(repository.clone(), strict_delete),
            repository,
        }
    }

    /// Counts shown on the home page
    pub async fn home(&self) -> AppResult<CatalogCounts> {
        self.aggregation.counts().await
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.find_all(Some("family_name")).await
    }

    pub async fn author_detail(&self, id: &str) -> AppResult<AuthorDetail> {
        self.aggregation.author_detail(id).await
    }

    pub async fn create_author(&self, input: AuthorInput) -> AppResult<Author> {
        let input = validated(input.sanitized())?;
        let author = self
            .repository
            .authors
            .insert(&Author::from_input(String::new(), input))
            .await?;
        tracing::info!("Created author {} ({})", author.id, author.name());
        Ok(author)
    }

    pub async fn update_author(&self, id: &str, input: AuthorInput) -> AppResult<Author> {
        let input = validated(input.sanitized())?;
        let author = self
            .repository
            .authors
            .update(id, &Author::from_input(id, input))
            .await?;
        tracing::info!("Updated author {}", id);
        Ok(author)
    }

    pub async fn can_delete_author(&self, id: &str) -> AppResult<DeleteCheck> {
        self.consistency.can_delete_author(id).await
    }

    /// Author with the guard decision, for the delete confirmation page
    pub async fn author_delete_view(&self, id: &str) -> AppResult<AuthorDeleteView> {
        let (author, check) = tokio::try_join!(
            self.repository.authors.find_by_id(id),
            self.consistency.can_delete_author(id),
        )?;
        Ok(AuthorDeleteView { author, check })
    }

    pub async fn delete_author(&self, id: &str) -> AppResult<DeleteOutcome> {
        self.consistency.delete_author(id).await
    }

    // =========================================================================
    // GENRES
    // =========================================================================

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.find_all(Some("name")).await
    }

    pub async fn genre_detail(&self, id: &str) -> AppResult<GenreDetail> {
        self.aggregation.genre_detail(id).await
    }

    /// Create a genre, or return the existing one carrying the same name.
    pub async fn create_genre(&self, input: GenreInput) -> AppResult<Genre> {
        let input = validated(input.sanitized())?;
        if let Some(existing) = self.repository.genres.find_by_name(&input.name).await? {
            tracing::debug!("Genre {:?} already exists as {}", existing.name, existing.id);
            return Ok(existing);
        }
        let genre = self
            .repository
            .genres
            .insert(&Genre::from_input(String::new(), input))
            .await?;
        tracing::info!("Created genre {} ({})", genre.id, genre.name);
        Ok(genre)
    }

    /// Rename a genre; the new name must not belong to another genre.
    pub async fn update_genre(&self, id: &str, input: GenreInput) -> AppResult<Genre> {
        let input = validated(input.sanitized())?;
        if let Some(existing) = self.repository.genres.find_by_name(&input.name).await? {
            if existing.id != id {
                return Err(AppError::field(
                    "name",
                    format!("Genre name {} is already in use", input.name),
                ));
            }
        }
        let genre = self
            .repository
            .genres
            .update(id, &Genre::from_input(id, input))
            .await?;
        tracing::info!("Updated genre {}", id);
        Ok(genre)
    }

    pub async fn can_delete_genre(&self, id: &str) -> AppResult<DeleteCheck> {
        self.consistency.can_delete_genre(id).await
    }

    /// Genre with the guard decision, for the delete confirmation page
    pub async fn genre_delete_view(&self, id: &str) -> AppResult<GenreDeleteView> {
        let (genre, check) = tokio::try_join!(
            self.repository.genres.find_by_id(id),
            self.consistency.can_delete_genre(id),
        )?;
        Ok(GenreDeleteView { genre, check })
    }

    pub async fn delete_genre(&self, id: &str) -> AppResult<DeleteOutcome> {
        self.consistency.delete_genre(id).await
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn list_books(&self) -> AppResult<Vec<BookListing>> {
        self.aggregation.book_list().await
    }

    pub async fn book_detail(&self, id: &str) -> AppResult<BookDetail> {
        self.aggregation.book_detail(id).await
    }

    /// Selection lists for a new book (`None`) or for editing `book_id`
    pub async fn book_form(&self, book_id: Option<&str>) -> AppResult<BookForm> {
        self.aggregation.book_form(book_id).await
    }

    pub async fn create_book(&self, input: BookInput) -> AppResult<Book> {
        let input = validated(input.sanitized())?;
        self.check_book_references(&input).await?;
        let book = self
            .repository
            .books
            .insert(&Book::from_input(String::new(), input))
            .await?;
        tracing::info!("Created book {} ({})", book.id, book.title);
        Ok(book)
    }

    pub async fn update_book(&self, id: &str, input: BookInput) -> AppResult<Book> {
        let input = validated(input.sanitized())?;
        self.check_book_references(&input).await?;
        let book = self
            .repository
            .books
            .update(id, &Book::from_input(id, input))
            .await?;
        tracing::info!("Updated book {}", id);
        Ok(book)
    }

    /// Unguarded: copies of the book keep their (now dangling) reference.
    pub async fn delete_book(&self, id: &str) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Deleted book {}", id);
        Ok(())
    }

    async fn check_book_references(&self, input: &BookInput) -> AppResult<()> {
        let result = tokio::try_join!(
            self.aggregation.resolve_author(&input.author),
            self.aggregation.resolve_genres(&input.genre),
        );
        if let Err(AppError::DanglingReference(ref msg)) = result {
            tracing::warn!("Rejected book write: {}", msg);
        }
        result.map(|_| ())
    }

    // =========================================================================
    // BOOK INSTANCES
    // =========================================================================

    pub async fn list_book_instances(&self) -> AppResult<Vec<BookInstanceListing>> {
        self.aggregation.book_instance_list().await
    }

    pub async fn book_instance_detail(&self, id: &str) -> AppResult<BookInstanceDetail> {
        self.aggregation.book_instance_detail(id).await
    }

    /// Selection list for a new copy (`None`) or for editing `instance_id`
    pub async fn book_instance_form(&self, instance_id: Option<&str>) -> AppResult<BookInstanceForm> {
        self.aggregation.book_instance_form(instance_id).await
    }

    pub async fn create_book_instance(&self, input: BookInstanceInput) -> AppResult<BookInstance> {
        let input = validated(input.sanitized())?;
        self.aggregation.resolve_book_exists(&input.book).await?;
        let instance = self
            .repository
            .book_instances
            .insert(&BookInstance::from_input(String::new(), input))
            .await?;
        tracing::info!("Created book instance {} of book {}", instance.id, instance.book);
        Ok(instance)
    }

    pub async fn update_book_instance(
        &self,
        id: &str,
        input: BookInstanceInput,
    ) -> AppResult<BookInstance> {
        let input = validated(input.sanitized())?;
        self.aggregation.resolve_book_exists(&input.book).await?;
        let instance = self
            .repository
            .book_instances
            .update(id, &BookInstance::from_input(id, input))
            .await?;
        tracing::info!("Updated book instance {}", id);
        Ok(instance)
    }

    pub async fn delete_book_instance(&self, id: &str) -> AppResult<()> {
        self.repository.book_instances.delete(id).await?;
        tracing::info!("Deleted book instance {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{Duration, Local};
    use serde_json::Value;

    use super::*;
    use crate::{
        error::{StoreError, StoreResult},
        models::{BookInstanceStatus, Entity},
        store::{ConditionalDelete, Dependents, DocumentStore, Filter, MemoryStore, SharedStore},
    };

    /// Delegates to a memory store but fails every read of one collection.
    struct FailingStore {
        inner: MemoryStore,
        broken: &'static str,
    }

    impl FailingStore {
        fn guard(&self, collection: &str) -> StoreResult<()> {
            if collection == self.broken {
                Err(StoreError::Backend(format!("{} unavailable", collection)))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn find_all(&self, collection: &str, sort: Option<&str>) -> StoreResult<Vec<Value>> {
            self.guard(collection)?;
            self.inner.find_all(collection, sort).await
        }

        async fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
            self.guard(collection)?;
            self.inner.find_by_id(collection, id).await
        }

        async fn find_by_filter(
            &self,
            collection: &str,
            filter: &Filter,
            projection: Option<&[&str]>,
        ) -> StoreResult<Vec<Value>> {
            self.guard(collection)?;
            self.inner.find_by_filter(collection, filter, projection).await
        }

        async fn insert(&self, collection: &str, document: Value) -> StoreResult<Value> {
            self.inner.insert(collection, document).await
        }

        async fn replace(
            &self,
            collection: &str,
            id: &str,
            document: Value,
        ) -> StoreResult<Option<Value>> {
            self.inner.replace(collection, id, document).await
        }

        async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
            self.inner.delete(collection, id).await
        }

        async fn count(&self, collection: &str, filter: Option<&Filter>) -> StoreResult<u64> {
            self.guard(collection)?;
            self.inner.count(collection, filter).await
        }

        async fn delete_unreferenced(
            &self,
            collection: &str,
            id: &str,
            dependents: Dependents<'_>,
        ) -> StoreResult<ConditionalDelete> {
            self.inner.delete_unreferenced(collection, id, dependents).await
        }
    }

    fn service() -> CatalogService {
        service_over(Arc::new(MemoryStore::new()))
    }

    fn service_over(store: SharedStore) -> CatalogService {
        CatalogService::new(Repository::new(store), false)
    }

    fn author_input(first_name: &str, family_name: &str) -> AuthorInput {
        AuthorInput {
            first_name: first_name.into(),
            family_name: family_name.into(),
            ..Default::default()
        }
    }

    fn book_input(title: &str, author: &str, genre: &[&str]) -> BookInput {
        BookInput {
            title: title.into(),
            summary: format!("Summary of {}", title),
            isbn: "9780000000000".into(),
            author: author.into(),
            genre: genre.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn copy_input(book: &str, status: BookInstanceStatus) -> BookInstanceInput {
        BookInstanceInput {
            book: book.into(),
            imprint: "London: Allen & Unwin".into(),
            status,
            due_back: status
                .expects_return()
                .then(|| Local::now().date_naive() + Duration::days(21)),
        }
    }

    #[tokio::test]
    async fn test_genre_name_is_natural_key() {
        let catalog = service();
        let first = catalog.create_genre(GenreInput::new("Fantasy")).await.unwrap();
        let second = catalog.create_genre(GenreInput::new("Fantasy")).await.unwrap();
        assert_eq!(first.id, second.id);

        let genres = catalog.list_genres().await.unwrap();
        assert_eq!(genres.iter().filter(|g| g.name == "Fantasy").count(), 1);

        let lower = catalog.create_genre(GenreInput::new("fantasy")).await.unwrap();
        assert_ne!(lower.id, first.id);
    }

    #[tokio::test]
    async fn test_genre_rename_onto_existing_name_rejected() {
        let catalog = service();
        catalog.create_genre(GenreInput::new("Fantasy")).await.unwrap();
        let poetry = catalog.create_genre(GenreInput::new("Poetry")).await.unwrap();

        let err = catalog
            .update_genre(&poetry.id, GenreInput::new("Fantasy"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref f) if f[0].field == "name"));

        let renamed = catalog
            .update_genre(&poetry.id, GenreInput::new("Verse"))
            .await
            .unwrap();
        assert_eq!(renamed.id, poetry.id);
        assert_eq!(renamed.name, "Verse");
    }

    #[tokio::test]
    async fn test_invalid_input_writes_nothing() {
        let catalog = service();
        let err = catalog.create_genre(GenreInput::new(" SF ")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(catalog.home().await.unwrap().genre_count, 0);
    }

    #[tokio::test]
    async fn test_book_with_unknown_author_is_dangling() {
        let catalog = service();
        let err = catalog
            .create_book(book_input("Orphan", "no-such-author", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DanglingReference(_)));
        assert_eq!(catalog.home().await.unwrap().book_count, 0);
    }

    #[tokio::test]
    async fn test_book_with_unknown_genre_is_dangling() {
        let catalog = service();
        let author = catalog.create_author(author_input("Ursula", "Le Guin")).await.unwrap();
        let genre = catalog.create_genre(GenreInput::new("Fantasy")).await.unwrap();
        let err = catalog
            .create_book(book_input("Earthsea", &author.id, &[&genre.id, "ghost"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DanglingReference(ref m) if m.contains("ghost")));
        assert!(catalog.list_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_never_changes_id() {
        let catalog = service();
        let author = catalog.create_author(author_input("Mary", "Shelley")).await.unwrap();
        let updated = catalog
            .update_author(&author.id, author_input("Mary", "Wollstonecraft Shelley"))
            .await
            .unwrap();
        assert_eq!(updated.id, author.id);
        assert_eq!(updated.family_name, "Wollstonecraft Shelley");

        let book = catalog
            .create_book(book_input("Frankenstein", &author.id, &[]))
            .await
            .unwrap();
        let updated = catalog
            .update_book(&book.id, book_input("Frankenstein; or, The Modern Prometheus", &author.id, &[]))
            .await
            .unwrap();
        assert_eq!(updated.id, book.id);

        let err = catalog
            .update_author("missing", author_input("No", "Body"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_book_detail_lists_exactly_its_copies() {
        let catalog = service();
        let author = catalog.create_author(author_input("Frank", "Herbert")).await.unwrap();
        let genre = catalog.create_genre(GenreInput::new("Science Fiction")).await.unwrap();
        let dune = catalog
            .create_book(book_input("Dune", &author.id, &[&genre.id]))
            .await
            .unwrap();
        let messiah = catalog
            .create_book(book_input("Dune Messiah", &author.id, &[]))
            .await
            .unwrap();

        let mut expected = Vec::new();
        for status in [BookInstanceStatus::Available, BookInstanceStatus::Loaned] {
            expected.push(catalog.create_book_instance(copy_input(&dune.id, status)).await.unwrap());
            catalog
                .create_book_instance(copy_input(&messiah.id, status))
                .await
                .unwrap();
        }

        let detail = catalog.book_detail(&dune.id).await.unwrap();
        assert_eq!(detail.instances, expected);
        assert_eq!(detail.author, author);
        assert_eq!(detail.genres, vec![genre]);

        let counts = catalog.home().await.unwrap();
        assert_eq!(counts.book_instance_count, 4);
        assert_eq!(counts.book_instance_available_count, 2);
        assert_eq!(counts.author_count, 1);
        assert_eq!(counts.book_count, 2);
    }

    #[tokio::test]
    async fn test_author_delete_blocked_until_books_gone() {
        let catalog = service();
        let tolkien = catalog.create_author(author_input("J. R. R.", "Tolkien")).await.unwrap();
        let hobbit = catalog
            .create_book(book_input("The Hobbit", &tolkien.id, &[]))
            .await
            .unwrap();

        let view = catalog.author_delete_view(&tolkien.id).await.unwrap();
        assert!(!view.check.allowed);
        assert_eq!(view.check.blocking_books, vec![hobbit.clone()]);

        let outcome = catalog.delete_author(&tolkien.id).await.unwrap();
        match outcome.clone().into_result(format!("author {}", tolkien.id)) {
            Err(AppError::DeleteBlocked { blocking_books, .. }) => {
                assert_eq!(blocking_books, vec![hobbit.clone()])
            }
            other => panic!("expected DeleteBlocked, got {:?}", other),
        }

        catalog.delete_book(&hobbit.id).await.unwrap();
        assert!(catalog.can_delete_author(&tolkien.id).await.unwrap().allowed);
        assert_eq!(
            catalog.delete_author(&tolkien.id).await.unwrap(),
            DeleteOutcome::Deleted
        );
        assert!(matches!(
            catalog.author_detail(&tolkien.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_genre_delete_guarded() {
        let catalog = service();
        let author = catalog.create_author(author_input("Mary", "Oliver")).await.unwrap();
        let poetry = catalog.create_genre(GenreInput::new("Poetry")).await.unwrap();
        let unused = catalog.create_genre(GenreInput::new("Horror")).await.unwrap();
        let book = catalog
            .create_book(book_input("Dream Work", &author.id, &[&poetry.id]))
            .await
            .unwrap();

        let view = catalog.genre_delete_view(&poetry.id).await.unwrap();
        assert_eq!(view.check.blocking_books, vec![book]);
        assert!(matches!(
            catalog.delete_genre(&poetry.id).await.unwrap(),
            DeleteOutcome::Blocked { .. }
        ));

        assert!(catalog.can_delete_genre(&unused.id).await.unwrap().allowed);
        assert_eq!(
            catalog.delete_genre(&unused.id).await.unwrap(),
            DeleteOutcome::Deleted
        );
    }

    #[tokio::test]
    async fn test_genre_detail_projects_books() {
        let catalog = service();
        let author = catalog.create_author(author_input("Anne", "Carson")).await.unwrap();
        let poetry = catalog.create_genre(GenreInput::new("Poetry")).await.unwrap();
        let book = catalog
            .create_book(book_input("Autobiography of Red", &author.id, &[&poetry.id]))
            .await
            .unwrap();
        catalog
            .create_book(book_input("Plainwater", &author.id, &[]))
            .await
            .unwrap();

        let detail = catalog.genre_detail(&poetry.id).await.unwrap();
        assert_eq!(detail.genre, poetry);
        assert_eq!(detail.books.len(), 1);
        assert_eq!(detail.books[0].id, book.id);
        assert_eq!(detail.books[0].summary, book.summary);
        assert_eq!(detail.books[0].url, book.url());
    }

    #[tokio::test]
    async fn test_copy_of_missing_book_is_dangling() {
        let catalog = service();
        let err = catalog
            .create_book_instance(copy_input("ghost", BookInstanceStatus::Available))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DanglingReference(_)));
    }

    #[tokio::test]
    async fn test_copy_survives_book_deletion() {
        let catalog = service();
        let author = catalog.create_author(author_input("Italo", "Calvino")).await.unwrap();
        let book = catalog
            .create_book(book_input("Invisible Cities", &author.id, &[]))
            .await
            .unwrap();
        let copy = catalog
            .create_book_instance(copy_input(&book.id, BookInstanceStatus::Reserved))
            .await
            .unwrap();

        let detail = catalog.book_instance_detail(&copy.id).await.unwrap();
        assert_eq!(detail.book_title.as_deref(), Some("Invisible Cities"));

        catalog.delete_book(&book.id).await.unwrap();
        let detail = catalog.book_instance_detail(&copy.id).await.unwrap();
        assert_eq!(detail.book_title, None);
        assert_eq!(catalog.list_book_instances().await.unwrap()[0].book_title, None);
    }

    #[tokio::test]
    async fn test_forms_mark_current_choices() {
        let catalog = service();
        let author = catalog.create_author(author_input("Jorge Luis", "Borges")).await.unwrap();
        let fantasy = catalog.create_genre(GenreInput::new("Fantasy")).await.unwrap();
        let essays = catalog.create_genre(GenreInput::new("Essays")).await.unwrap();
        let book = catalog
            .create_book(book_input("Ficciones", &author.id, &[&fantasy.id]))
            .await
            .unwrap();
        let copy = catalog
            .create_book_instance(copy_input(&book.id, BookInstanceStatus::Maintenance))
            .await
            .unwrap();

        let form = catalog.book_form(Some(&book.id)).await.unwrap();
        assert_eq!(form.authors, vec![author]);
        let checked: Vec<(&str, bool)> = form
            .genres
            .iter()
            .map(|g| (g.genre.name.as_str(), g.checked))
            .collect();
        assert_eq!(checked, vec![("Essays", false), ("Fantasy", true)]);
        assert_eq!(form.book.as_ref().map(|b| b.id.as_str()), Some(book.id.as_str()));

        let blank = catalog.book_form(None).await.unwrap();
        assert!(blank.genres.iter().all(|g| !g.checked));
        assert!(blank.book.is_none());
        assert_eq!(blank.genres.len(), 2);
        assert!(blank.genres.iter().any(|g| g.genre == essays));

        let form = catalog.book_instance_form(Some(&copy.id)).await.unwrap();
        assert!(form.books.iter().all(|b| b.selected));
        assert!(catalog.book_instance_form(Some("ghost")).await.is_err());
    }

    #[tokio::test]
    async fn test_book_list_resolves_authors() {
        let catalog = service();
        let author = catalog.create_author(author_input("Octavia", "Butler")).await.unwrap();
        catalog.create_book(book_input("Kindred", &author.id, &[])).await.unwrap();
        catalog.create_book(book_input("Dawn", &author.id, &[])).await.unwrap();

        let rows = catalog.list_books().await.unwrap();
        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Dawn", "Kindred"]);
        assert!(rows.iter().all(|r| r.author.as_ref() == Some(&author)));
    }

    #[tokio::test]
    async fn test_failed_subfetch_fails_whole_aggregate() {
        let inner = MemoryStore::new();
        let seeded = service_over(Arc::new(inner.clone()));
        let author = seeded.create_author(author_input("Toni", "Morrison")).await.unwrap();
        seeded.create_book(book_input("Beloved", &author.id, &[])).await.unwrap();

        let catalog = service_over(Arc::new(FailingStore {
            inner,
            broken: "books",
        }));
        assert!(matches!(
            catalog.author_detail(&author.id).await,
            Err(AppError::Store(_))
        ));
        assert!(matches!(catalog.home().await, Err(AppError::Store(_))));
        assert!(matches!(catalog.list_books().await, Err(AppError::Store(_))));
        assert!(catalog.list_authors().await.is_ok());
    }
}
