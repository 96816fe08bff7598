//! Genre endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        views::{GenreDeleteView, GenreDetail},
        Genre, GenreInput,
    },
};

use super::{created, Created};

/// List all genres by name
#[utoipa::path(
    get,
    path = "/catalog/genres",
    tag = "genres",
    responses(
        (status = 200, description = "List of genres", body = Vec<Genre>)
    )
)]
pub async fn list_genres(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.services.catalog.list_genres().await?;
    Ok(Json(genres))
}

/// Get a genre with the books carrying it
#[utoipa::path(
    get,
    path = "/catalog/genre/{id}",
    tag = "genres",
    params(
        ("id" = String, Path, description = "Genre ID")
    ),
    responses(
        (status = 200, description = "Genre details", body = GenreDetail),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn get_genre(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<GenreDetail>> {
    let detail = state.services.catalog.genre_detail(&id).await?;
    Ok(Json(detail))
}

/// Create a genre, or return the existing genre with the same name
#[utoipa::path(
    post,
    path = "/catalog/genres",
    tag = "genres",
    request_body = GenreInput,
    responses(
        (status = 201, description = "Genre created or resolved by name", body = Genre),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_genre(
    State(state): State<crate::AppState>,
    Json(input): Json<GenreInput>,
) -> AppResult<Created<Genre>> {
    let genre = state.services.catalog.create_genre(input).await?;
    Ok(created(genre))
}

/// Rename a genre
#[utoipa::path(
    put,
    path = "/catalog/genre/{id}",
    tag = "genres",
    params(
        ("id" = String, Path, description = "Genre ID")
    ),
    request_body = GenreInput,
    responses(
        (status = 200, description = "Genre updated", body = Genre),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn update_genre(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(input): Json<GenreInput>,
) -> AppResult<Json<Genre>> {
    let genre = state.services.catalog.update_genre(&id, input).await?;
    Ok(Json(genre))
}

/// Show whether a genre can be deleted, and which books prevent it
#[utoipa::path(
    get,
    path = "/catalog/genre/{id}/delete",
    tag = "genres",
    params(
        ("id" = String, Path, description = "Genre ID")
    ),
    responses(
        (status = 200, description = "Delete decision", body = GenreDeleteView),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn delete_genre_view(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<GenreDeleteView>> {
    let view = state.services.catalog.genre_delete_view(&id).await?;
    Ok(Json(view))
}

/// Delete a genre that no book references
#[utoipa::path(
    delete,
    path = "/catalog/genre/{id}",
    tag = "genres",
    params(
        ("id" = String, Path, description = "Genre ID")
    ),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 404, description = "Genre not found"),
        (status = 409, description = "Books still reference this genre", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_genre(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state
        .services
        .catalog
        .delete_genre(&id)
        .await?
        .into_result(format!("genre {}", id))?;
    Ok(StatusCode::NO_CONTENT)
}
