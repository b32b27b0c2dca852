//! JWT token issuance and verification
//!
//! Tokens are stateless: nothing is stored server-side, so a token stays valid
//! until it expires (or forever when expiry is disabled).

use crate::{config::AppConfig, error::AppError};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Issued at
    pub iat: i64,

    /// Expiration, absent for non-expiring tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// A freshly signed token
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    /// seconds until the token expires
    pub expires_in: Option<u64>,
}

/// JWT service
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_exp_secs: Option<u64>,
}

impl JwtService {
    /// Minimum secret length for HS256
    pub const MIN_SECRET_LEN: usize = 32;

    /// Create JWT service from a signing secret
    ///
    /// `token_exp_secs == 0` issues tokens without an `exp` claim.
    pub fn new(secret: &str, token_exp_secs: u64) -> Result<Self, AppError> {
        if secret.len() < Self::MIN_SECRET_LEN {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        let token_exp_secs = (token_exp_secs > 0).then_some(token_exp_secs);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        if token_exp_secs.is_none() {
            // Still rejects an expired `exp` if one is present
            validation.required_spec_claims.clear();
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            token_exp_secs,
        })
    }

    /// Create JWT service from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.as_ref().ok_or_else(|| {
            AppError::Config("security.jwt_secret is not configured".to_string())
        })?;

        Self::new(secret.expose_secret(), config.security.token_exp_secs)
    }

    /// Sign a token for a verified identity
    pub fn issue(&self, username: &str) -> Result<IssuedToken, AppError> {
        let now = Utc::now().timestamp();

        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp: self.token_exp_secs.map(|secs| now + secs as i64),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!("Failed to encode token: {:?}", e);
                AppError::internal(format!("Failed to encode token: {}", e))
            })?;

        Ok(IssuedToken {
            token,
            expires_in: self.token_exp_secs,
        })
    }

    /// Validate signature and claims, decode the identity
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                AppError::Forbidden
            })?
            .claims;

        if claims.sub.is_empty() {
            return Err(AppError::Forbidden);
        }

        Ok(claims)
    }

    pub fn token_exp_secs(&self) -> Option<u64> {
        self.token_exp_secs
    }
}
