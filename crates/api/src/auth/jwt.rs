//! Bearer token verification.
//!
//! Tokens are minted by the identity service in front of Formkit and carry
//! only the user id. Organization roles are looked up per request, so a role
//! change takes effect without re-issuing tokens. [`issue_token`] exists for
//! local development and tests.

use formkit_core::types::DbId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DEFAULT_TOKEN_TTL_MINS: i64 = 60;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HS256 secret.
    pub secret: String,
    /// Required `iss` claim, when set.
    pub issuer: Option<String>,
    /// Lifetime of tokens minted by [`issue_token`].
    pub token_ttl_mins: i64,
}

impl JwtConfig {
    /// | Env Var          | Required | Default |
    /// |------------------|----------|---------|
    /// | `JWT_SECRET`     | **yes**  | --      |
    /// | `JWT_ISSUER`     | no       | unset   |
    /// | `JWT_TTL_MINS`   | no       | `60`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.is_empty(), "JWT_SECRET must be set and non-empty");

        let issuer = std::env::var("JWT_ISSUER")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let token_ttl_mins = match std::env::var("JWT_TTL_MINS") {
            Ok(raw) => raw.parse().expect("JWT_TTL_MINS must be an integer"),
            Err(_) => DEFAULT_TOKEN_TTL_MINS,
        };

        Self {
            secret,
            issuer,
            token_ttl_mins,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::default();
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
            // `set_issuer` only checks `iss` when present.
            validation.set_required_spec_claims(&["exp", "iss"]);
        }
        validation
    }
}

/// Mint a token for `user_id`, stamped with the configured issuer.
pub fn issue_token(user_id: DbId, config: &JwtConfig) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        exp: now + config.token_ttl_mins * 60,
        iat: now,
        iss: config.issuer.clone(),
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature, expiry and (if configured) issuer.
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &config.validation(),
    )
    .map(|data| data.claims)
}
