//! Owner access token verification.
//!
//! Survey owners sign in through an external identity provider that issues
//! HS256-signed access tokens. This module verifies those tokens and exposes
//! the subject as the owner's user id. Issuing tokens is only compiled for
//! tests and for builds enabling the `test-util` feature.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Access token claims issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Verifier for owner access tokens.
#[derive(Clone)]
pub struct JwtConfig {
    #[cfg(any(test, feature = "test-util"))]
    encoding_key: jsonwebtoken::EncodingKey,
    decoding_key: DecodingKey,
    audience: Option<String>,
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("audience", &self.audience)
            .field("leeway_secs", &self.leeway_secs)
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl JwtConfig {
    /// Creates a config from the provider's shared HS256 secret.
    pub fn from_secret(
        secret: &str,
        audience: Option<String>,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidKey("JWT secret must not be empty".into()));
        }

        Ok(Self {
            #[cfg(any(test, feature = "test-util"))]
            encoding_key: jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            audience,
            leeway_secs,
        })
    }

    /// Issues an access token for the given user, valid for `expiry_secs`.
    ///
    /// Production tokens come from the identity provider; this exists for
    /// tests and local tooling.
    #[cfg(any(test, feature = "test-util"))]
    pub fn issue_access_token(&self, user_id: Uuid, expiry_secs: i64) -> Result<String, JwtError> {
        use chrono::{Duration, Utc};
        use jsonwebtoken::{encode, Header};

        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + Duration::seconds(expiry_secs)).timestamp(),
            iat: now.timestamp(),
            email: None,
            aud: self.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates an access token and returns its claims.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;
        match &self.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidAudience => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}

/// Extracts user ID from validated claims.
pub fn extract_user_id(claims: &Claims) -> Result<Uuid, JwtError> {
    Uuid::parse_str(&claims.sub).map_err(|_| JwtError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> JwtConfig {
        JwtConfig::from_secret("test_secret_key_for_jwt_testing_12345", None, 0).unwrap()
    }

    #[test]
    fn test_issue_and_validate_access_token() {
        let config = create_test_config();
        let user_id = Uuid::new_v4();

        let token = config.issue_access_token(user_id, 900).unwrap();
        let claims = config.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(extract_user_id(&claims).unwrap(), user_id);
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = JwtConfig::from_secret("", None, 0);
        assert!(matches!(result, Err(JwtError::InvalidKey(_))));
    }

    #[test]
    fn test_expired_token() {
        let config = create_test_config();
        let token = config.issue_access_token(Uuid::new_v4(), -120).unwrap();

        let result = config.validate_access_token(&token);
        assert!(
            matches!(result, Err(JwtError::TokenExpired)),
            "Expected TokenExpired, got: {:?}",
            result
        );
    }

    #[test]
    fn test_token_signed_with_other_secret() {
        let issuer = JwtConfig::from_secret("another_secret_entirely_000000", None, 0).unwrap();
        let token = issuer.issue_access_token(Uuid::new_v4(), 900).unwrap();

        let result = create_test_config().validate_access_token(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_audience_mismatch() {
        let issuer =
            JwtConfig::from_secret("shared_secret_value_12345", Some("other".into()), 0).unwrap();
        let verifier =
            JwtConfig::from_secret("shared_secret_value_12345", Some("authenticated".into()), 0)
                .unwrap();
        let token = issuer.issue_access_token(Uuid::new_v4(), 900).unwrap();

        assert!(matches!(
            verifier.validate_access_token(&token),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_audience_match() {
        let config =
            JwtConfig::from_secret("shared_secret_value_12345", Some("authenticated".into()), 0)
                .unwrap();
        let token = config.issue_access_token(Uuid::new_v4(), 900).unwrap();
        let claims = config.validate_access_token(&token).unwrap();
        assert_eq!(claims.aud.as_deref(), Some("authenticated"));
    }

    #[test]
    fn test_garbage_token() {
        let config = create_test_config();
        assert!(config.validate_access_token("not.a.jwt").is_err());
        assert!(config.validate_access_token("").is_err());
    }

    #[test]
    fn test_extract_user_id_invalid_subject() {
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            exp: 0,
            iat: 0,
            email: None,
            aud: None,
        };
        assert!(matches!(
            extract_user_id(&claims),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let debug_str = format!("{:?}", create_test_config());
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("test_secret_key"));
    }
}
