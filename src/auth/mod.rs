pub mod token;

use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use token::TokenValidator;

/// Claims carried by a bearer token. Only `iss` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
}

impl Claims {
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            iss: issuer.into(),
            sub: None,
            exp: None,
            iat: None,
        }
    }
}

/// Reasons a request failed authentication. Never shown to the client.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("expecting Authorization header")]
    MissingHeader,

    #[error("Authorization header is not valid text")]
    InvalidHeader,

    #[error("expecting Bearer auth type")]
    NotBearer,

    #[error("empty secret")]
    EmptySecret,

    #[error("parsing token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Sign claims with the shared HMAC secret (HS256).
///
/// Production tokens come from the issuer service; this mints tokens the
/// server will accept for local tooling and the test suites.
pub fn sign_token(claims: &Claims, secret: &[u8]) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::EmptySecret);
    }

    let encoding_key = EncodingKey::from_secret(secret);
    Ok(encode(&Header::default(), claims, &encoding_key)?)
}
