//! Bearer-token authentication extractor

use crate::api::error::ApiError;
use crate::api::server::AppState;
use crate::auth::Claims;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

/// Claims of the caller's validated bearer token.
///
/// Adding this to a handler's arguments makes the route require
/// `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingToken)?;

        if bearer.token().is_empty() {
            return Err(ApiError::MissingToken);
        }

        let claims = state.tokens.validate(bearer.token())?;
        Ok(AuthUser(claims))
    }
}
