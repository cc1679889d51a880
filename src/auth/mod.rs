//! Dashboard user authentication
//!
//! Flat-file credential store with Argon2id password hashes, plus stateless
//! HS256 bearer tokens.

mod password;
mod store;
mod token;

pub use password::{hash_password, verify_password};
pub use store::{StoredUser, UserPublic, UserStore};
pub use token::{Claims, TokenService, TOKEN_TTL_DAYS};

use thiserror::Error;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Errors raised by the credential store and token service
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("User already exists")]
    DuplicateUser,

    /// Unknown email and wrong password are deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("token signing failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
