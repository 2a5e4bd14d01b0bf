//! Genre model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Stored genre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i64,
    /// Unique genre name
    pub name: String,
    pub description: Option<String>,
}

/// Create or replace genre request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct GenreRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Genre name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "Description must be less than 500 characters"))]
    pub description: Option<String>,
}
