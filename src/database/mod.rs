pub mod models;
pub mod mysql;
pub mod schema;

use async_trait::async_trait;
use thiserror::Error;

use crate::filter::PageRequest;

pub use models::{Image, NewImage};
pub use mysql::MySqlImageStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid connection settings: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Read access to image records.
///
/// Ordering and the `done` filter are the store's job; callers hand the
/// result to clients as-is.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn get_images(&self, page: &PageRequest) -> Result<Vec<Image>, StoreError>;
}
