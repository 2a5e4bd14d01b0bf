//! API handlers for the library REST endpoints

pub mod auth;
pub mod authors;
pub mod books;
pub mod genres;
pub mod health;
pub mod middleware;
pub mod openapi;

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    http::request::Parts,
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use validator::Validate;

use crate::{error::AppError, models::user::Principal, AppState};

/// Principal attached by the request gate; rejects with 401 when absent
pub struct AuthenticatedUser(pub Principal);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or_else(|| AppError::Authentication("Full authentication is required".to_string()))
    }
}

/// Principal holding the admin role, checked before the request body is read
pub struct AdminUser(pub Principal);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(principal) = AuthenticatedUser::from_request_parts(parts, state).await?;
        principal.require_admin()?;
        Ok(AdminUser(principal))
    }
}

/// Numeric `:id` path segment
pub struct EntityId(pub i64);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for EntityId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|e: PathRejection| AppError::BadRequest(e.body_text()))?;
        Ok(EntityId(id))
    }
}

/// JSON body that has passed its `validator` rules
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| AppError::BadRequest(e.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Build the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/me", get(auth::me))
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        // Genres
        .route("/genres", get(genres::list_genres).post(genres::create_genre))
        .route(
            "/genres/:id",
            get(genres::get_genre)
                .put(genres::update_genre)
                .delete(genres::delete_genre),
        )
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::authenticate,
        ))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
