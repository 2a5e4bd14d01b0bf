//! Author endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::author::{Author, AuthorRequest},
};

use super::{AdminUser, AuthenticatedUser, EntityId, ValidatedJson};

/// List all authors
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of authors", body = Vec<Author>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<Vec<Author>>> {
    principal.require_reader()?;

    let authors = state.services.authors.list().await?;
    Ok(Json(authors))
}

/// Get author by ID
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    EntityId(id): EntityId,
) -> AppResult<Json<Author>> {
    principal.require_reader()?;

    let author = state.services.authors.get_by_id(id).await?;
    Ok(Json(author))
}

/// Create a new author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorRequest,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Administrator role required"),
        (status = 409, description = "Author name already exists")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    ValidatedJson(data): ValidatedJson<AuthorRequest>,
) -> AppResult<(StatusCode, Json<Author>)> {
    let created = state.services.authors.create(&data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace an existing author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Author ID")
    ),
    request_body = AuthorRequest,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Author name already exists")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    EntityId(id): EntityId,
    ValidatedJson(data): ValidatedJson<AuthorRequest>,
) -> AppResult<Json<Author>> {
    let updated = state.services.authors.update(id, &data).await?;
    Ok(Json(updated))
}

/// Delete an author without books
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Author still has books")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    EntityId(id): EntityId,
) -> AppResult<StatusCode> {
    state.services.authors.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
