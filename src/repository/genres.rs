//! Genre-specific queries

use super::GenresRepository;
use crate::{error::AppResult, models::Genre, store::Filter};

impl GenresRepository {
    /// Exact, case-sensitive lookup on the natural key
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        let mut genres = self.find_by_filter(&Filter::eq("name", name)).await?;
        if genres.is_empty() {
            Ok(None)
        } else {
            Ok(Some(genres.swap_remove(0)))
        }
    }
}
