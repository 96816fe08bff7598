//! Book instance (copy) endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        views::{BookInstanceDetail, BookInstanceForm, BookInstanceListing},
        BookInstance, BookInstanceInput,
    },
};

use super::{created, Created};

/// List all copies with the title of their book
#[utoipa::path(
    get,
    path = "/catalog/bookinstances",
    tag = "bookinstances",
    responses(
        (status = 200, description = "List of copies", body = Vec<BookInstanceListing>)
    )
)]
pub async fn list_book_instances(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BookInstanceListing>>> {
    let instances = state.services.catalog.list_book_instances().await?;
    Ok(Json(instances))
}

/// Get a copy with its book title
#[utoipa::path(
    get,
    path = "/catalog/bookinstance/{id}",
    tag = "bookinstances",
    params(
        ("id" = String, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Copy details", body = BookInstanceDetail),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn get_book_instance(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BookInstanceDetail>> {
    let detail = state.services.catalog.book_instance_detail(&id).await?;
    Ok(Json(detail))
}

/// Books to choose from when creating a copy
#[utoipa::path(
    get,
    path = "/catalog/bookinstance/create",
    tag = "bookinstances",
    responses(
        (status = 200, description = "Form selection list", body = BookInstanceForm)
    )
)]
pub async fn create_book_instance_form(
    State(state): State<crate::AppState>,
) -> AppResult<Json<BookInstanceForm>> {
    let form = state.services.catalog.book_instance_form(None).await?;
    Ok(Json(form))
}

/// Books to choose from when editing a copy, its current book selected
#[utoipa::path(
    get,
    path = "/catalog/bookinstance/{id}/update",
    tag = "bookinstances",
    params(
        ("id" = String, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Form selection list", body = BookInstanceForm),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn update_book_instance_form(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BookInstanceForm>> {
    let form = state.services.catalog.book_instance_form(Some(&id)).await?;
    Ok(Json(form))
}

/// Create a new copy of a book
#[utoipa::path(
    post,
    path = "/catalog/bookinstances",
    tag = "bookinstances",
    request_body = BookInstanceInput,
    responses(
        (status = 201, description = "Copy created", body = BookInstance),
        (status = 400, description = "Invalid input"),
        (status = 422, description = "Book does not exist")
    )
)]
pub async fn create_book_instance(
    State(state): State<crate::AppState>,
    Json(input): Json<BookInstanceInput>,
) -> AppResult<Created<BookInstance>> {
    let instance = state.services.catalog.create_book_instance(input).await?;
    Ok(created(instance))
}

/// Replace a copy's fields
#[utoipa::path(
    put,
    path = "/catalog/bookinstance/{id}",
    tag = "bookinstances",
    params(
        ("id" = String, Path, description = "Book instance ID")
    ),
    request_body = BookInstanceInput,
    responses(
        (status = 200, description = "Copy updated", body = BookInstance),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Copy not found"),
        (status = 422, description = "Book does not exist")
    )
)]
pub async fn update_book_instance(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(input): Json<BookInstanceInput>,
) -> AppResult<Json<BookInstance>> {
    let instance = state
        .services
        .catalog
        .update_book_instance(&id, input)
        .await?;
    Ok(Json(instance))
}

/// Delete a copy
#[utoipa::path(
    delete,
    path = "/catalog/bookinstance/{id}",
    tag = "bookinstances",
    params(
        ("id" = String, Path, description = "Book instance ID")
    ),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn delete_book_instance(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book_instance(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
