//! Signed, time-limited bearer tokens (HS512 JWT)

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
};

/// Claims carried by every token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Username
    pub sub: String,
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies tokens with a key derived from the configured secret.
///
/// Holds no mutable state; verification is safe to call from any number of
/// tasks at once.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS512);
        // Expiry is the only invalidation mechanism, with no tolerance
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        // chrono durations are bounded by i64 milliseconds
        let secs = i64::try_from(config.jwt_expiration_secs)
            .unwrap_or(i64::MAX)
            .min(i64::MAX / 1_000);
        Self::new(&config.jwt_secret, Duration::seconds(secs))
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Sign a token for `subject`, valid from `now` for the configured lifetime
    pub fn issue(&self, subject: &str, roles: &[String], now: DateTime<Utc>) -> AppResult<String> {
        let claims = TokenClaims {
            sub: subject.to_string(),
            roles: roles.to_vec(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.lifetime)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .timestamp(),
        };

        encode(&Header::new(Algorithm::HS512), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Check signature, structure and expiry; return the embedded claims
    pub fn verify(&self, token: &str) -> AppResult<TokenClaims> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::InvalidToken(e.to_string()))
    }

    pub fn parse_subject(&self, token: &str) -> AppResult<String> {
        self.verify(token).map(|claims| claims.sub)
    }

    pub fn parse_roles(&self, token: &str) -> AppResult<Vec<String>> {
        self.verify(token).map(|claims| claims.roles)
    }
}
