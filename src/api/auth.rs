//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::user::{RegisterRequest, User},
};

use super::{AuthenticatedUser, ValidatedJson};

/// Login request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Username or email
    #[serde(default)]
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response with bearer token
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
}

/// Identity carried by the caller's token
#[derive(Debug, Serialize, ToSchema)]
pub struct PrincipalInfo {
    pub username: String,
    pub roles: Vec<String>,
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing credentials", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let issued = state
        .services
        .auth
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: issued.token,
        token_type: "Bearer".to_string(),
    }))
}

/// Self-register a reader account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Username or email already in use", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.services.auth.register(&request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get the authenticated principal
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current principal", body = PrincipalInfo),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(AuthenticatedUser(principal): AuthenticatedUser) -> Json<PrincipalInfo> {
    Json(PrincipalInfo {
        roles: principal.roles.iter().map(ToString::to_string).collect(),
        username: principal.username,
    })
}
