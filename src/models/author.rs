//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Stored author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: i64,
    /// Unique author name
    pub name: String,
    pub biography: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// Create or replace author request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Author name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "Biography must be less than 500 characters"))]
    pub biography: Option<String>,
    pub birth_date: Option<NaiveDate>,
}
