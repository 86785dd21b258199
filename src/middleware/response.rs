use axum::{
    extract::{Request, State},
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::{ApiError, ErrorClassifier, ErrorCode, PendingError};
use crate::server::AppState;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Error envelope returned to clients
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    err: String,
}

/// Turns an [`ApiError`] into the final response and owns the logging and
/// disclosure policy for it.
#[derive(Debug, Clone, Default)]
pub struct ErrorResponder {
    classifier: ErrorClassifier,
    expose_internal_errors: bool,
}

impl ErrorResponder {
    pub fn new(classifier: ErrorClassifier, expose_internal_errors: bool) -> Self {
        Self {
            classifier,
            expose_internal_errors,
        }
    }

    pub fn render(&self, error: &ApiError) -> Response {
        let (code, status) = self.classifier.classify(error);

        let err = match code {
            ErrorCode::Internal => {
                tracing::error!(op = ?error.op, error = %error, "{}", error.message);
                if self.expose_internal_errors {
                    error.cause().map(|c| c.to_string()).unwrap_or_else(|| error.to_string())
                } else {
                    code.to_string()
                }
            }
            _ => {
                tracing::debug!(code = %code, op = ?error.op, error = %error, "Request rejected");
                code.to_string()
            }
        };

        let body = ErrorBody {
            message: &error.message,
            err,
        };

        match serde_json::to_vec(&body) {
            Ok(bytes) => (
                status,
                [(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
                bytes,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize error body: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
        }
    }
}

/// Top-level adapter: successful responses pass through, handler errors are
/// rendered into a complete JSON envelope.
pub async fn error_response_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    match response.extensions_mut().remove::<PendingError>() {
        Some(PendingError(error)) => state.errors.render(&error),
        None => response,
    }
}
