use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthError, Claims, TokenValidator};
use crate::error::ApiError;
use crate::server::AppState;

const OP: &str = "auth";
const MESSAGE: &str = "Authorization failed.";

/// Bearer-token gate. The wrapped handler only runs for a valid token; every
/// failure becomes the same unauthorized error with the detail kept as cause.
pub async fn bearer_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = authorize(request.headers(), &state.tokens)
        .map_err(|e| ApiError::unauthorized(OP, MESSAGE, e))?;

    tracing::debug!(issuer = %claims.iss, subject = ?claims.sub, "Bearer token accepted");
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

fn authorize(headers: &HeaderMap, tokens: &TokenValidator) -> Result<Claims, AuthError> {
    let token = extract_bearer(headers)?;
    tokens.validate(token)
}

/// Token from `Authorization: Bearer <token>`; the prefix is case-sensitive
fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;
    let header = header.to_str().map_err(|_| AuthError::InvalidHeader)?;
    header.strip_prefix("Bearer ").ok_or(AuthError::NotBearer)
}
