//! Catalog home page

use axum::{extract::State, Json};

use crate::{error::AppResult, models::views::CatalogCounts};

/// Record counts for every collection
#[utoipa::path(
    get,
    path = "/catalog",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog summary", body = CatalogCounts)
    )
)]
pub async fn index(State(state): State<crate::AppState>) -> AppResult<Json<CatalogCounts>> {
    let counts = state.services.catalog.home().await?;
    Ok(Json(counts))
}
