//! Signed bearer tokens

use super::{AuthError, UserPublic};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Fixed token lifetime
pub const TOKEN_TTL_DAYS: i64 = 7;

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates HS256 tokens with a server-held secret
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Mint a token for a user, valid for [`TOKEN_TTL_DAYS`]
    pub fn issue(&self, user: &UserPublic) -> Result<String, AuthError> {
        self.issue_at(user, Utc::now())
    }

    pub(crate) fn issue_at(&self, user: &UserPublic, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            user_id: user.id.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verify signature and expiry
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserPublic {
        UserPublic {
            id: "u-1".to_string(),
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_validate() {
        let service = TokenService::new("test-secret");
        let token = service.issue(&user()).unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.user_id, "u-1");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_DAYS * 24 * 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = TokenService::new("test-secret");
        let token = service
            .issue_at(&user(), Utc::now() - Duration::days(TOKEN_TTL_DAYS + 1))
            .unwrap();

        assert!(matches!(service.validate(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenService::new("secret-a").issue(&user()).unwrap();
        let result = TokenService::new("secret-b").validate(&token);

        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = TokenService::new("test-secret");
        let token = service.issue(&user()).unwrap();

        // Swap the payload for one claiming a different user
        let forged_claims = Claims {
            user_id: "u-2".to_string(),
            email: "b@x.com".to_string(),
            iat: 0,
            exp: i64::MAX / 2,
        };
        let forged = encode(
            &Header::new(Algorithm::HS256),
            &forged_claims,
            &EncodingKey::from_secret(b"other"),
        )
        .unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload = forged.split('.').nth(1).unwrap();
        parts[1] = forged_payload;

        assert!(service.validate(&parts.join(".")).is_err());
        assert!(service.validate("garbage").is_err());
    }
}
