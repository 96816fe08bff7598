//! Author endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        views::{AuthorDeleteView, AuthorDetail},
        Author, AuthorInput,
    },
};

use super::{created, Created};

/// List all authors by family name
#[utoipa::path(
    get,
    path = "/catalog/authors",
    tag = "authors",
    responses(
        (status = 200, description = "List of authors", body = Vec<Author>)
    )
)]
pub async fn list_authors(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Author>>> {
    let authors = state.services.catalog.list_authors().await?;
    Ok(Json(authors))
}

/// Get an author with their books
#[utoipa::path(
    get,
    path = "/catalog/author/{id}",
    tag = "authors",
    params(
        ("id" = String, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorDetail),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AuthorDetail>> {
    let detail = state.services.catalog.author_detail(&id).await?;
    Ok(Json(detail))
}

/// Create a new author
#[utoipa::path(
    post,
    path = "/catalog/authors",
    tag = "authors",
    request_body = AuthorInput,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    Json(input): Json<AuthorInput>,
) -> AppResult<Created<Author>> {
    let author = state.services.catalog.create_author(input).await?;
    Ok(created(author))
}

/// Replace an author's fields
#[utoipa::path(
    put,
    path = "/catalog/author/{id}",
    tag = "authors",
    params(
        ("id" = String, Path, description = "Author ID")
    ),
    request_body = AuthorInput,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(input): Json<AuthorInput>,
) -> AppResult<Json<Author>> {
    let author = state.services.catalog.update_author(&id, input).await?;
    Ok(Json(author))
}

/// Show whether an author can be deleted, and which books prevent it
#[utoipa::path(
    get,
    path = "/catalog/author/{id}/delete",
    tag = "authors",
    params(
        ("id" = String, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Delete decision", body = AuthorDeleteView),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author_view(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AuthorDeleteView>> {
    let view = state.services.catalog.author_delete_view(&id).await?;
    Ok(Json(view))
}

/// Delete an author that no book references
#[utoipa::path(
    delete,
    path = "/catalog/author/{id}",
    tag = "authors",
    params(
        ("id" = String, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Books still reference this author", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state
        .services
        .catalog
        .delete_author(&id)
        .await?
        .into_result(format!("author {}", id))?;
    Ok(StatusCode::NO_CONTENT)
}
