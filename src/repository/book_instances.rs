//! Book instance queries

use super::BookInstancesRepository;
use crate::{
    error::AppResult,
    models::{
        book_instance::{BOOK_FIELD, STATUS_FIELD},
        BookInstance, BookInstanceStatus,
    },
    store::Filter,
};

impl BookInstancesRepository {
    /// Every copy of `book_id`
    pub async fn find_by_book(&self, book_id: &str) -> AppResult<Vec<BookInstance>> {
        self.find_by_filter(&Filter::eq(BOOK_FIELD, book_id)).await
    }

    pub async fn count_with_status(&self, status: BookInstanceStatus) -> AppResult<u64> {
        self.count(Some(&Filter::eq(STATUS_FIELD, status.as_str())))
            .await
    }
}
