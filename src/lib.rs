pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use error::{ApiError, ErrorClassifier, ErrorCode};
pub use server::{build_router, AppState};
