//! HTTP front end: form page, on-demand training and form-post prediction.

mod api;
mod error;
mod form;
mod handlers;
mod state;
mod view;

pub use api::create_router;
pub use error::ServerError;
pub use form::{parse_heart_data, FormError};
pub use state::AppState;
pub use view::IndexTemplate;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::constants::{APP_HOST, APP_PORT, STATIC_DIR, TEMPLATE_DIR};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: Option<PathBuf>,
    pub template_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| APP_HOST.to_string()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(APP_PORT),
            static_dir: Some(
                std::env::var("STATIC_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(STATIC_DIR)),
            ),
            template_dir: std::env::var("TEMPLATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(TEMPLATE_DIR)),
        }
    }
}

pub async fn run_server(config: ServerConfig, state: Arc<AppState>) -> std::io::Result<()> {
    if let Some(dir) = &config.static_dir {
        if !dir.exists() {
            warn!(static_dir = %dir.display(), "Static directory not found, /static will return 404");
        }
    }

    let app = create_router(state, &config);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening");

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c");
        }
        info!("Shutdown signal received, stopping server");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}
