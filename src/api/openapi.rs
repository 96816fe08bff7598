//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, book_instances, books, genres, health, home};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Local library catalog: authors, books, genres and book instances"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Home
        home::index,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author_view,
        authors::delete_author,
        // Genres
        genres::list_genres,
        genres::get_genre,
        genres::create_genre,
        genres::update_genre,
        genres::delete_genre_view,
        genres::delete_genre,
        // Books
        books::list_books,
        books::get_book,
        books::create_book_form,
        books::update_book_form,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Book instances
        book_instances::list_book_instances,
        book_instances::get_book_instance,
        book_instances::create_book_instance_form,
        book_instances::update_book_instance_form,
        book_instances::create_book_instance,
        book_instances::update_book_instance,
        book_instances::delete_book_instance,
    ),
    components(
        schemas(
            // Entities
            crate::models::Author,
            crate::models::AuthorInput,
            crate::models::Genre,
            crate::models::GenreInput,
            crate::models::Book,
            crate::models::BookInput,
            crate::models::BookInstance,
            crate::models::BookInstanceInput,
            crate::models::BookInstanceStatus,
            // Views
            crate::models::views::CatalogCounts,
            crate::models::views::AuthorDetail,
            crate::models::views::BookDetail,
            crate::models::views::BookSummary,
            crate::models::views::GenreDetail,
            crate::models::views::BookInstanceDetail,
            crate::models::views::BookListing,
            crate::models::views::BookInstanceListing,
            crate::models::views::GenreOption,
            crate::models::views::BookForm,
            crate::models::views::BookOption,
            crate::models::views::BookInstanceForm,
            crate::models::views::DeleteCheck,
            crate::models::views::AuthorDeleteView,
            crate::models::views::GenreDeleteView,
            // Errors
            crate::error::ErrorResponse,
            crate::error::FieldError,
            // Health
            health::HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Catalog summary"),
        (name = "authors", description = "Author management"),
        (name = "genres", description = "Genre management"),
        (name = "books", description = "Book management"),
        (name = "bookinstances", description = "Book instance (copy) management"),
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
