pub mod auth;
pub mod response;

pub use auth::bearer_auth_middleware;
pub use response::{error_response_middleware, ErrorResponder, JSON_CONTENT_TYPE};
