//! Book model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Stored book. Author and genre are held as foreign keys only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    /// Unique when present
    pub isbn: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub author_id: i64,
    pub genre_id: i64,
}

/// Create or replace book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Book title must be between 1 and 200 characters"))]
    pub title: String,
    #[validate(length(max = 13, message = "ISBN must be less than 13 characters"))]
    pub isbn: Option<String>,
    pub publication_date: Option<NaiveDate>,
    #[validate(length(max = 1000, message = "Description must be less than 1000 characters"))]
    pub description: Option<String>,
    // Explicit renames also key validation errors by the wire name
    #[serde(rename = "authorId")]
    #[validate(required(message = "Author ID is required"))]
    pub author_id: Option<i64>,
    #[serde(rename = "genreId")]
    #[validate(required(message = "Genre ID is required"))]
    pub genre_id: Option<i64>,
}

/// Book row with resolved references, ready for the store
#[derive(Debug, Clone, PartialEq)]
pub struct BookData {
    pub title: String,
    pub isbn: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub author_id: i64,
    pub genre_id: i64,
}
