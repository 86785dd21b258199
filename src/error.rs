// HTTP API Error Types
use std::fmt;
use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse};

/// Boxed cause carried by an [`ApiError`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Public error category exposed to clients
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Internal,
    Unauthorized,
    /// A code attached by some layer that the classifier does not know about.
    Other(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::Internal => "internal",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::Other(code) => code,
        }
    }

    /// Whether this code has an entry in the status table
    pub fn is_recognized(&self) -> bool {
        !matches!(self, ErrorCode::Other(_))
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "internal" => ErrorCode::Internal,
            "unauthorized" => ErrorCode::Unauthorized,
            other => ErrorCode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured handler error.
///
/// Created where the failure happens and returned up to the adapter layer,
/// which is the only place that logs it or decides what the client sees.
#[derive(Debug)]
pub struct ApiError {
    pub code: Option<ErrorCode>,
    pub message: String,
    pub op: Option<&'static str>,
    source: Option<BoxError>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            op: None,
            source: None,
        }
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_op(mut self, op: &'static str) -> Self {
        self.op = Some(op);
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Opaque failure: the cause is logged, never disclosed by default
    pub fn internal(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::new(message)
            .with_code(ErrorCode::Internal)
            .with_source(source)
    }

    pub fn unauthorized(op: &'static str, message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::new(message)
            .with_code(ErrorCode::Unauthorized)
            .with_op(op)
            .with_source(source)
    }

    /// The wrapped cause, if any
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// The wrapped cause when it is itself an `ApiError`
    pub fn nested(&self) -> Option<&ApiError> {
        self.cause().and_then(|cause| cause.downcast_ref::<ApiError>())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(op) = self.op {
            write!(f, "{}: ", op)?;
        }

        // A wrapped cause speaks for itself; otherwise print code and message.
        match &self.source {
            Some(source) => write!(f, "{}", source),
            None => {
                if let Some(code) = &self.code {
                    write!(f, "<{}> ", code)?;
                }
                f.write_str(&self.message)
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn std::error::Error + 'static))
    }
}

/// Maps an error chain to its public code and HTTP status.
///
/// The status table is a closed match over [`ErrorCode`]; nothing mutates it.
#[derive(Debug, Clone, Copy)]
pub struct ErrorClassifier {
    max_depth: usize,
}

impl ErrorClassifier {
    pub const MAX_CAUSE_DEPTH: usize = 16;

    pub const fn new() -> Self {
        Self {
            max_depth: Self::MAX_CAUSE_DEPTH,
        }
    }

    /// Innermost recognized code in the chain, `internal` when there is none
    pub fn code(&self, err: &ApiError) -> ErrorCode {
        let mut current = Some(err);
        for _ in 0..self.max_depth {
            let Some(e) = current else { break };
            if let Some(code) = e.code.as_ref().filter(|code| code.is_recognized()) {
                return code.clone();
            }
            current = e.nested();
        }
        ErrorCode::Internal
    }

    pub fn status(&self, code: &ErrorCode) -> StatusCode {
        match code {
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn classify(&self, err: &ApiError) -> (ErrorCode, StatusCode) {
        let code = self.code(err);
        let status = self.status(&code);
        (code, status)
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Error waiting in response extensions for the adapter layer to render
#[derive(Debug, Clone)]
pub struct PendingError(pub Arc<ApiError>);

// Status line and body are written by `middleware::error_response_middleware`.
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response
            .extensions_mut()
            .insert(PendingError(Arc::new(self)));
        response
    }
}
