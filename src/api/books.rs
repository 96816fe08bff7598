//! Book endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        views::{BookDetail, BookForm, BookListing},
        Book, BookInput,
    },
};

use super::{created, Created};

/// List all books by title, with their authors
#[utoipa::path(
    get,
    path = "/catalog/books",
    tag = "books",
    responses(
        (status = 200, description = "List of books", body = Vec<BookListing>)
    )
)]
pub async fn list_books(State(state): State<crate::AppState>) -> AppResult<Json<Vec<BookListing>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Get a book with its author, genres and copies
#[utoipa::path(
    get,
    path = "/catalog/book/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetail),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Book references a missing author or genre")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BookDetail>> {
    let detail = state.services.catalog.book_detail(&id).await?;
    Ok(Json(detail))
}

/// Authors and genres to choose from when creating a book
#[utoipa::path(
    get,
    path = "/catalog/book/create",
    tag = "books",
    responses(
        (status = 200, description = "Form selection lists", body = BookForm)
    )
)]
pub async fn create_book_form(State(state): State<crate::AppState>) -> AppResult<Json<BookForm>> {
    let form = state.services.catalog.book_form(None).await?;
    Ok(Json(form))
}

/// Authors and genres to choose from when editing a book, current genres checked
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/update",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Form selection lists", body = BookForm),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book_form(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BookForm>> {
    let form = state.services.catalog.book_form(Some(&id)).await?;
    Ok(Json(form))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/catalog/books",
    tag = "books",
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 422, description = "Author or genre does not exist")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    Json(input): Json<BookInput>,
) -> AppResult<Created<Book>> {
    let book = state.services.catalog.create_book(input).await?;
    Ok(created(book))
}

/// Replace a book's fields
#[utoipa::path(
    put,
    path = "/catalog/book/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Author or genre does not exist")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(input): Json<BookInput>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.update_book(&id, input).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/catalog/book/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
