//! Authentication API endpoints

use crate::api::error::ApiError;
use crate::api::extract::AuthUser;
use crate::api::server::AppState;
use crate::auth::{UserPublic, MIN_PASSWORD_LEN};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Signup request
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Signup/login response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserPublic,
}

/// Token verification response
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub user: UserPublic,
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

/// Trimmed, non-empty field value
fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Create an account and return a token for it
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let (Some(name), Some(email), Some(password)) = (
        required(&req.name),
        required(&req.email),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::Validation(
            "Name, email, and password are required".to_string(),
        ));
    };

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    if !email_regex().is_match(email) {
        return Err(ApiError::Validation("Email address is not valid".to_string()));
    }

    let user = state.users.create(name, email, password).await?;
    let token = state.tokens.issue(&user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".to_string(),
            token,
            user,
        }),
    ))
}

/// Exchange credentials for a token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let (Some(email), Some(password)) = (
        required(&req.email),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    };

    let user = state.users.verify(email, password).await?;
    let token = state.tokens.issue(&user)?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user,
    }))
}

/// Resolve the token's user
pub async fn verify(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<VerifyResponse>, ApiError> {
    let user = state
        .users
        .find_by_email(&claims.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

    Ok(Json(VerifyResponse { user }))
}
