//! Connection authentication.
//!
//! The hub trusts whatever user ID it is handed, so every upgrade goes
//! through a [`ConnectionAuthenticator`] first. The bundled implementation
//! validates HS256 JWTs and takes the `sub` claim as the user ID.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use chathub_core::config::AuthConfig;
use chathub_core::error::AppError;

/// JWT claims accepted on connection tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the user ID.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Claims for `user_id` valid for `ttl` from now.
    pub fn new(user_id: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.into(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// Identity established for a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// User ID handed to the hub.
    pub user_id: String,
}

/// Turns a bearer token into an identity.
#[async_trait]
pub trait ConnectionAuthenticator: Send + Sync + std::fmt::Debug + 'static {
    /// Validates `token` and returns the user it belongs to.
    async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AppError>;
}

/// HS256 JWT authenticator.
#[derive(Clone)]
pub struct JwtAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuthenticator")
            .field("leeway", &self.validation.leeway)
            .finish()
    }
}

impl JwtAuthenticator {
    /// Creates an authenticator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Signs a token for `user_id`. Used by development tooling and tests;
    /// production tokens come from the identity service.
    pub fn issue(&self, user_id: &str, ttl: Duration) -> Result<String, AppError> {
        let claims = Claims::new(user_id, ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }

    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                JwtErrorKind::ExpiredSignature => AppError::authentication("Token has expired"),
                _ => AppError::authentication(format!("Invalid token: {e}")),
            }
        })?;
        Ok(data.claims)
    }
}

#[async_trait]
impl ConnectionAuthenticator for JwtAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let claims = self.decode_token(token)?;

        if claims.sub.trim().is_empty() {
            return Err(AppError::authentication("Token subject is empty"));
        }

        Ok(AuthenticatedUser {
            user_id: claims.sub,
        })
    }
}

#[cfg(test)]
mod tests {
    use chathub_core::error::ErrorKind;

    use super::*;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            leeway_seconds: 0,
        }
    }

    #[tokio::test]
    async fn test_valid_token_yields_subject() {
        let auth = JwtAuthenticator::new(&config("s3cret"));
        let token = auth.issue("alice", Duration::minutes(5)).expect("issue");

        let user = auth.authenticate(&token).await.expect("authenticate");
        assert_eq!(user.user_id, "alice");
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let auth = JwtAuthenticator::new(&config("s3cret"));
        let token = auth.issue("alice", Duration::minutes(-10)).expect("issue");

        let err = auth.authenticate(&token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert!(err.message.contains("expired"));
    }

    #[tokio::test]
    async fn test_foreign_signature_rejected() {
        let issuer = JwtAuthenticator::new(&config("other"));
        let auth = JwtAuthenticator::new(&config("s3cret"));
        let token = issuer.issue("mallory", Duration::minutes(5)).expect("issue");

        let err = auth.authenticate(&token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_garbage_and_empty_subject_rejected() {
        let auth = JwtAuthenticator::new(&config("s3cret"));
        assert!(auth.authenticate("not-a-jwt").await.is_err());

        let token = auth.issue("  ", Duration::minutes(5)).expect("issue");
        assert!(auth.authenticate(&token).await.is_err());
    }
}
