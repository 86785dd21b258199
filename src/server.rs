use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::TokenValidator;
use crate::config::{Config, ConfigError, PagingConfig};
use crate::database::ImageStore;
use crate::error::ErrorClassifier;
use crate::handlers;
use crate::middleware::{bearer_auth_middleware, error_response_middleware, ErrorResponder};

/// Immutable per-process state shared by every request
#[derive(Clone)]
pub struct AppState {
    pub images: Arc<dyn ImageStore>,
    pub tokens: Arc<TokenValidator>,
    pub errors: Arc<ErrorResponder>,
    pub paging: PagingConfig,
    pub version: Arc<str>,
}

impl AppState {
    pub fn new(
        images: Arc<dyn ImageStore>,
        tokens: TokenValidator,
        errors: ErrorResponder,
        paging: PagingConfig,
        version: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            images,
            tokens: Arc::new(tokens),
            errors: Arc::new(errors),
            paging,
            version: version.into(),
        }
    }

    pub fn from_config(images: Arc<dyn ImageStore>, config: &Config, version: impl Into<Arc<str>>) -> Self {
        Self::new(
            images,
            TokenValidator::new(config.security.secret.as_bytes(), &config.security.issuer),
            ErrorResponder::new(ErrorClassifier::new(), config.api.expose_internal_errors),
            config.api.paging(),
            version,
        )
    }
}

/// `<name> <version> (<os>/<arch>)`
pub fn version_banner() -> String {
    format!(
        "{} {} ({}/{})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/images", get(handlers::list_images))
        .route_layer(middleware::from_fn_with_state(state.clone(), bearer_auth_middleware));

    Router::new()
        .route("/", get(handlers::home))
        .merge(protected)
        .layer(middleware::from_fn_with_state(state.clone(), error_response_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// First socket address `host:port` resolves to
pub async fn resolve_listen_addr(addr: &str) -> std::io::Result<SocketAddr> {
    tokio::net::lookup_host(addr).await?.next().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} did not resolve to any address", addr),
        )
    })
}

/// Serve until the listener fails; HTTPS when a certificate pair is configured
pub async fn serve(config: &Config, router: Router) -> Result<(), ServeError> {
    let addr = resolve_listen_addr(&config.listen_addr()?).await?;

    match config.tls.pair() {
        Some((cert, key)) => {
            let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert, key).await?;
            info!("tanmatsu listening on https://{}", addr);
            axum_server::bind_rustls(addr, tls)
                .serve(router.into_make_service())
                .await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!("tanmatsu listening on http://{}", addr);
            axum::serve(listener, router).await?;
        }
    }
    Ok(())
}
