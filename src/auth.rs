//! Password hashing and signed bearer tokens.
//!
//! Passwords are stored as bcrypt hashes (`$2b$<cost>$...`). Tokens are HS256
//! JWTs carrying the user id and username, valid for the configured TTL.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::model::User;

/// Lowest bcrypt cost the hasher accepts.
pub const MIN_HASH_COST: u32 = 4;
/// Highest bcrypt cost the hasher accepts.
pub const MAX_HASH_COST: u32 = 31;

/// Auth failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Token is malformed or its signature does not match.
    #[error("invalid token")]
    InvalidToken,

    /// Token signature is valid but `exp` is in the past.
    #[error("token expired")]
    Expired,

    /// Password could not be hashed.
    #[error("password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    /// Claims could not be signed.
    #[error("token encoding error: {0}")]
    Encode(String),
}

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id.
    pub id: String,
    pub username: String,
    /// Issued at, Unix epoch seconds.
    pub iat: i64,
    /// Expiry, Unix epoch seconds.
    pub exp: i64,
}

/// Issues and verifies tokens; hashes and checks passwords.
#[derive(Clone)]
pub struct Authenticator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl_secs: i64,
    hash_cost: u32,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}

impl Authenticator {
    /// `hash_cost` is clamped to the range bcrypt supports.
    pub fn new(secret: impl AsRef<[u8]>, token_ttl_secs: u64, hash_cost: u32) -> Self {
        let secret = secret.as_ref();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            token_ttl_secs: i64::try_from(token_ttl_secs).unwrap_or(i64::MAX),
            hash_cost: hash_cost.clamp(MIN_HASH_COST, MAX_HASH_COST),
        }
    }

    /// Build from config. An empty secret is replaced by a random one.
    pub fn from_config(config: &AuthConfig) -> Self {
        if config.jwt_secret.is_empty() {
            warn!("auth.jwt_secret is not set; tokens are signed with a random per-process secret");
            let secret: [u8; 32] = rand::random();
            Self::new(secret, config.token_ttl_secs, config.hash_cost)
        } else {
            Self::new(&config.jwt_secret, config.token_ttl_secs, config.hash_cost)
        }
    }

    /// Hash `password` with a fresh random salt at the configured cost.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        Ok(bcrypt::hash(password, self.hash_cost)?)
    }

    /// Check `password` against a stored hash. Malformed hashes never verify.
    pub fn verify_password(password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or_else(|e| {
            debug!("stored password hash is unusable: {e}");
            false
        })
    }

    /// Issue a token for `user` valid for the configured TTL.
    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        self.issue_token_at(user, chrono::Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (epoch seconds).
    pub fn issue_token_at(&self, user: &User, now: i64) -> Result<String, AuthError> {
        let claims = TokenClaims {
            id: user.id.clone(),
            username: user.username.clone(),
            iat: now,
            exp: now.saturating_add(self.token_ttl_secs),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Encode(e.to_string()))
    }

    /// Verify signature and expiry against the system clock, returning the claims.
    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken,
            })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
