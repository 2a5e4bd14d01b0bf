//! Request gate establishing the caller's identity from a bearer token

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{models::user::Principal, AppState};

/// Attach a [`Principal`] to the request when it carries a valid bearer token.
///
/// Never rejects: a missing or invalid token leaves the request
/// unauthenticated and the handler's own authorization check decides.
pub async fn authenticate(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(TypedHeader(Authorization(bearer))) = bearer {
        match state.services.auth.tokens().verify(bearer.token()) {
            Ok(claims) => {
                let principal = Principal::from_claims(claims.sub, &claims.roles);
                request.extensions_mut().insert(principal);
            }
            Err(e) => {
                tracing::debug!("Ignoring bearer token: {}", e);
            }
        }
    }

    next.run(request).await
}
