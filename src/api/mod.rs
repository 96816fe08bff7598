//! API handlers for the catalog REST endpoints

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod health;
pub mod home;
pub mod openapi;

use axum::{
    http::{header, HeaderName, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{models::Entity, AppState};

/// 201 response carrying the new record and its canonical link
pub type Created<T> = (StatusCode, [(HeaderName, String); 1], Json<T>);

pub(crate) fn created<T: Entity>(entity: T) -> Created<T> {
    (
        StatusCode::CREATED,
        [(header::LOCATION, entity.url())],
        Json(entity),
    )
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Home
        .route("/catalog", get(home::index))
        // Authors
        .route("/catalog/authors", get(authors::list_authors))
        .route("/catalog/authors", post(authors::create_author))
        .route("/catalog/author/:id", get(authors::get_author))
        .route("/catalog/author/:id", put(authors::update_author))
        .route("/catalog/author/:id", delete(authors::delete_author))
        .route("/catalog/author/:id/delete", get(authors::delete_author_view))
        // Genres
        .route("/catalog/genres", get(genres::list_genres))
        .route("/catalog/genres", post(genres::create_genre))
        .route("/catalog/genre/:id", get(genres::get_genre))
        .route("/catalog/genre/:id", put(genres::update_genre))
        .route("/catalog/genre/:id", delete(genres::delete_genre))
        .route("/catalog/genre/:id/delete", get(genres::delete_genre_view))
        // Books
        .route("/catalog/books", get(books::list_books))
        .route("/catalog/books", post(books::create_book))
        .route("/catalog/book/create", get(books::create_book_form))
        .route("/catalog/book/:id", get(books::get_book))
        .route("/catalog/book/:id", put(books::update_book))
        .route("/catalog/book/:id", delete(books::delete_book))
        .route("/catalog/book/:id/update", get(books::update_book_form))
        // Book instances
        .route("/catalog/bookinstances", get(book_instances::list_book_instances))
        .route("/catalog/bookinstances", post(book_instances::create_book_instance))
        .route("/catalog/bookinstance/create", get(book_instances::create_book_instance_form))
        .route("/catalog/bookinstance/:id", get(book_instances::get_book_instance))
        .route("/catalog/bookinstance/:id", put(book_instances::update_book_instance))
        .route("/catalog/bookinstance/:id", delete(book_instances::delete_book_instance))
        .route("/catalog/bookinstance/:id/update", get(book_instances::update_book_instance_form))
        .route("/catalog/bookinstance/:id/delete", get(book_instances::get_book_instance))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
