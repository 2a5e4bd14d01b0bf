//! Book endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{Book, BookRequest},
};

use super::{AdminUser, AuthenticatedUser, EntityId, ValidatedJson};

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of books", body = Vec<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    principal.require_reader()?;

    let books = state.services.books.list().await?;
    Ok(Json(books))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    EntityId(id): EntityId,
) -> AppResult<Json<Book>> {
    principal.require_reader()?;

    let book = state.services.books.get_by_id(id).await?;
    Ok(Json(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookRequest,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Author or genre not found"),
        (status = 409, description = "ISBN already exists")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    ValidatedJson(data): ValidatedJson<BookRequest>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state.services.books.create(&data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace an existing book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    request_body = BookRequest,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book, author or genre not found"),
        (status = 409, description = "ISBN already exists")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    EntityId(id): EntityId,
    ValidatedJson(data): ValidatedJson<BookRequest>,
) -> AppResult<Json<Book>> {
    let updated = state.services.books.update(id, &data).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    EntityId(id): EntityId,
) -> AppResult<StatusCode> {
    state.services.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
