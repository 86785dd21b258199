use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Image {
    pub id: i64,
    pub url: String,
    pub done: bool,
    pub kuid: i32,
    pub created: DateTime<Utc>,
    pub player: String,
    pub channel: String,
}

/// Fields supplied when inserting an image; id and timestamp come from the database
#[derive(Debug, Clone, Default)]
pub struct NewImage {
    pub url: String,
    pub done: bool,
    pub kuid: i32,
    pub player: String,
    pub channel: String,
}
