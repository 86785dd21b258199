use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::{info, warn};

use super::schema::TABLES;
use super::{Image, ImageStore, NewImage, StoreError};
use crate::config::DatabaseConfig;
use crate::filter::PageRequest;

/// MySQL-backed image store
#[derive(Debug, Clone)]
pub struct MySqlImageStore {
    pool: MySqlPool,
}

impl MySqlImageStore {
    const PING_ATTEMPTS: u32 = 10;
    const PING_BACKOFF: Duration = Duration::from_secs(1);

    /// Open a pool and wait until the database answers
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config.connection_url()?;
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_lazy(url.as_str())?;

        let store = Self::from_pool(pool);
        store.wait_until_reachable().await?;
        info!(host = ?url.host_str(), database = url.path(), "Connected to image store");
        Ok(store)
    }

    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn wait_until_reachable(&self) -> Result<(), StoreError> {
        let mut last_error = None;
        for attempt in 1..=Self::PING_ATTEMPTS {
            match sqlx::query("SELECT 1").execute(&self.pool).await {
                Ok(_) => return Ok(()),
                Err(e) => {
                    warn!(attempt, error = %e, "database ping failed");
                    last_error = Some(e);
                }
            }
            if attempt < Self::PING_ATTEMPTS {
                tokio::time::sleep(Self::PING_BACKOFF).await;
            }
        }

        Err(StoreError::Unavailable(format!(
            "database ping attempts failed: {}",
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    /// Insert an image together with the message it belongs to; returns the image id
    pub async fn create_image(&self, image: &NewImage) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;

        let message = sqlx::query("INSERT INTO messages (message, player, channel) VALUES (?, ?, ?)")
            .bind("")
            .bind(&image.player)
            .bind(&image.channel)
            .execute(&mut *tx)
            .await?;

        let inserted = sqlx::query("INSERT INTO images (url, done, kuid, message_id) VALUES (?, ?, ?, ?)")
            .bind(&image.url)
            .bind(image.done)
            .bind(image.kuid)
            .bind(message.last_insert_id())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(inserted.last_insert_id() as i64)
    }

    pub async fn create_schema(&self) -> Result<(), StoreError> {
        for (_, ddl) in TABLES {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn drop_schema(&self) -> Result<(), StoreError> {
        for (table, _) in TABLES.iter().rev() {
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    fn select_page_sql(page: &PageRequest) -> String {
        let filter = if page.done_only { "WHERE img.done = 1" } else { "" };
        format!(
            "SELECT CAST(img.id AS SIGNED) AS id, img.url, img.done, img.kuid, img.created, m.player, m.channel \
             FROM images img JOIN messages m ON img.message_id = m.id {} \
             ORDER BY img.created {} LIMIT ?, ?",
            filter,
            page.order.to_sql()
        )
    }
}

#[async_trait]
impl ImageStore for MySqlImageStore {
    async fn get_images(&self, page: &PageRequest) -> Result<Vec<Image>, StoreError> {
        let sql = Self::select_page_sql(page);
        let images = sqlx::query_as::<_, Image>(&sql)
            .bind(page.offset)
            .bind(page.limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(images)
    }
}
