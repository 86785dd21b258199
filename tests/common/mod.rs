#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use tanmatsu::auth::{sign_token, Claims, TokenValidator};
use tanmatsu::config::PagingConfig;
use tanmatsu::database::{Image, ImageStore, StoreError};
use tanmatsu::error::ErrorClassifier;
use tanmatsu::filter::PageRequest;
use tanmatsu::middleware::ErrorResponder;
use tanmatsu::server::{build_router, AppState};

pub const SECRET: &str = "test-secret";
pub const ISSUER: &str = "monban";

pub struct TestServer {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn(store: Arc<dyn ImageStore>) -> Self {
        Self::spawn_with(store, false).await
    }

    /// Same router as production, bound to an ephemeral port
    pub async fn spawn_with(store: Arc<dyn ImageStore>, expose_internal_errors: bool) -> Self {
        let state = AppState::new(
            store,
            TokenValidator::new(SECRET.as_bytes(), ISSUER),
            ErrorResponder::new(ErrorClassifier::new(), expose_internal_errors),
            PagingConfig::default(),
            "tanmatsu test",
        );
        let app = build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn token() -> String {
    token_from(ISSUER)
}

pub fn token_from(issuer: &str) -> String {
    sign_token(&Claims::new(issuer), SECRET.as_bytes()).expect("failed to sign token")
}

pub fn image(id: i64, done: bool, minute: u32) -> Image {
    Image {
        id,
        url: format!("https://example.com/{}.png", id),
        done,
        kuid: id as i32,
        created: Utc.with_ymd_and_hms(2017, 3, 14, 15, minute, 0).unwrap(),
        player: "john".to_string(),
        channel: "#kusubooru".to_string(),
    }
}

/// In-memory store that filters, orders and pages like the MySQL one and
/// remembers every page it was asked for.
#[derive(Default)]
pub struct MemoryStore {
    images: Vec<Image>,
    pages: Mutex<Vec<PageRequest>>,
}

impl MemoryStore {
    pub fn new(images: Vec<Image>) -> Self {
        Self {
            images,
            pages: Mutex::new(Vec::new()),
        }
    }

    pub fn last_page(&self) -> PageRequest {
        self.pages.lock().unwrap().last().cloned().expect("store was not called")
    }

    pub fn calls(&self) -> usize {
        self.pages.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageStore for MemoryStore {
    async fn get_images(&self, page: &PageRequest) -> Result<Vec<Image>, StoreError> {
        self.pages.lock().unwrap().push(page.clone());

        let mut images: Vec<Image> = self
            .images
            .iter()
            .filter(|img| !page.done_only || img.done)
            .cloned()
            .collect();
        images.sort_by_key(|img| img.created);
        if !page.ascending() {
            images.reverse();
        }

        Ok(images
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }
}

/// Store whose every call fails
pub struct FailingStore(pub &'static str);

#[async_trait]
impl ImageStore for FailingStore {
    async fn get_images(&self, _page: &PageRequest) -> Result<Vec<Image>, StoreError> {
        Err(StoreError::Unavailable(self.0.to_string()))
    }
}
