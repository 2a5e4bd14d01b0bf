//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, genres, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library API",
        version = "1.0.0",
        description = "Library catalog REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::register,
        auth::me,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Genres
        genres::list_genres,
        genres::get_genre,
        genres::create_genre,
        genres::update_genre,
        genres::delete_genre,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::PrincipalInfo,
            crate::models::user::RegisterRequest,
            crate::models::user::User,
            crate::models::user::Role,
            // Catalog
            crate::models::author::Author,
            crate::models::author::AuthorRequest,
            crate::models::genre::Genre,
            crate::models::genre::GenreRequest,
            crate::models::book::Book,
            crate::models::book::BookRequest,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "authors", description = "Author management"),
        (name = "genres", description = "Genre management"),
        (name = "books", description = "Book management")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
