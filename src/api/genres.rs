//! Genre endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::genre::{Genre, GenreRequest},
};

use super::{AdminUser, AuthenticatedUser, EntityId, ValidatedJson};

/// List all genres
#[utoipa::path(
    get,
    path = "/genres",
    tag = "genres",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of genres", body = Vec<Genre>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_genres(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<Vec<Genre>>> {
    principal.require_reader()?;

    let genres = state.services.genres.list().await?;
    Ok(Json(genres))
}

/// Get genre by ID
#[utoipa::path(
    get,
    path = "/genres/{id}",
    tag = "genres",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Genre ID")
    ),
    responses(
        (status = 200, description = "Genre details", body = Genre),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn get_genre(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    EntityId(id): EntityId,
) -> AppResult<Json<Genre>> {
    principal.require_reader()?;

    let genre = state.services.genres.get_by_id(id).await?;
    Ok(Json(genre))
}

/// Create a new genre
#[utoipa::path(
    post,
    path = "/genres",
    tag = "genres",
    security(("bearer_auth" = [])),
    request_body = GenreRequest,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Genre name already exists")
    )
)]
pub async fn create_genre(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    ValidatedJson(data): ValidatedJson<GenreRequest>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    let created = state.services.genres.create(&data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace an existing genre
#[utoipa::path(
    put,
    path = "/genres/{id}",
    tag = "genres",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Genre ID")
    ),
    request_body = GenreRequest,
    responses(
        (status = 200, description = "Genre updated", body = Genre),
        (status = 404, description = "Genre not found"),
        (status = 409, description = "Genre name already exists")
    )
)]
pub async fn update_genre(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    EntityId(id): EntityId,
    ValidatedJson(data): ValidatedJson<GenreRequest>,
) -> AppResult<Json<Genre>> {
    let updated = state.services.genres.update(id, &data).await?;
    Ok(Json(updated))
}

/// Delete a genre without books
#[utoipa::path(
    delete,
    path = "/genres/{id}",
    tag = "genres",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Genre ID")
    ),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 404, description = "Genre not found"),
        (status = 409, description = "Genre still has books")
    )
)]
pub async fn delete_genre(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    EntityId(id): EntityId,
) -> AppResult<StatusCode> {
    state.services.genres.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
