//! Guarded deletion of records that books depend on

use crate::{
    error::AppResult,
    models::{
        views::{DeleteCheck, DeleteOutcome},
        Entity,
    },
    repository::{
        books::{BY_AUTHOR, BY_GENRE},
        EntityRepository, Repository,
    },
    store::Dependents,
};

/// Decides whether an author or genre may be deleted.
///
/// In the default mode a delete is check-then-act: a book created between the check and the
/// delete is not seen. With `strict` the store performs a single conditional delete instead.
#[derive(Clone)]
pub struct ConsistencyEngine {
    repository: Repository,
    strict: bool,
}

impl ConsistencyEngine {
    pub fn new(repository: Repository, strict: bool) -> Self {
        Self { repository, strict }
    }

    /// Allowed iff no book references the author.
    pub async fn can_delete_author(&self, id: &str) -> AppResult<DeleteCheck> {
        self.check(&self.repository.authors, id, BY_AUTHOR).await
    }

    /// Allowed iff no book carries the genre.
    pub async fn can_delete_genre(&self, id: &str) -> AppResult<DeleteCheck> {
        self.check(&self.repository.genres, id, BY_GENRE).await
    }

    pub async fn delete_author(&self, id: &str) -> AppResult<DeleteOutcome> {
        self.guarded_delete(&self.repository.authors, id, BY_AUTHOR)
            .await
    }

    pub async fn delete_genre(&self, id: &str) -> AppResult<DeleteOutcome> {
        self.guarded_delete(&self.repository.genres, id, BY_GENRE)
            .await
    }

    /// Fails with `NotFound` when `id` does not resolve in `repo`.
    async fn check<T: Entity>(
        &self,
        repo: &EntityRepository<T>,
        id: &str,
        dependents: Dependents<'_>,
    ) -> AppResult<DeleteCheck> {
        let filter = dependents.filter(id);
        let (_, books) = tokio::try_join!(
            repo.find_by_id(id),
            self.repository.books.find_by_filter(&filter),
        )?;
        Ok(DeleteCheck::from_blocking(books))
    }

    async fn guarded_delete<T: Entity>(
        &self,
        repo: &EntityRepository<T>,
        id: &str,
        dependents: Dependents<'_>,
    ) -> AppResult<DeleteOutcome> {
        let blocking_books = if self.strict {
            match repo.delete_unreferenced(id, dependents).await? {
                Ok(()) => Vec::new(),
                Err(blocking_books) => blocking_books,
            }
        } else {
            let check = self.check(repo, id, dependents).await?;
            if check.allowed {
                repo.delete(id).await?;
            }
            check.blocking_books
        };

        if blocking_books.is_empty() {
            tracing::info!("Deleted {} {}", T::KIND, id);
            Ok(DeleteOutcome::Deleted)
        } else {
            tracing::warn!(
                "Refused to delete {} {}: {} book(s) still reference it",
                T::KIND,
                id,
                blocking_books.len()
            );
            Ok(DeleteOutcome::Blocked { blocking_books })
        }
    }
}
