use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid,
    pub company_id: Uuid,
    pub role: Role,
    pub exp: i64,
}

/// Signs and verifies bearer tokens with a shared HMAC secret.
pub struct Authenticator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Authenticator {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Issue a token for tooling and tests. The service itself has no login route.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Encode` if signing fails.
    pub fn issue_token(
        &self,
        user_id: Uuid,
        company_id: Uuid,
        role: Role,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user_id,
            company_id,
            role,
            exp: (Utc::now() + ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verify an `Authorization` header value of the form `Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for a non-bearer scheme, a bad
    /// signature, malformed claims or an expired token.
    pub fn verify(&self, authorization: &str) -> Result<Claims, AuthError> {
        let token = authorization
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::InvalidToken("expected Bearer scheme".to_string()))?;

        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}
