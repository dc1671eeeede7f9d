//! Fragments API
//!
//! HTTP service storing small typed text fragments per owner and serving them
//! back verbatim or converted to another content type.

mod auth;
mod backend;
mod config;
mod dto;
mod error;
mod handlers;
mod routes;

use std::sync::Arc;

use anyhow::Result;
use axum::http::HeaderName;
use fragments_aws::{AwsBackend, AwsBackendConfig};
use fragments_domain::{FragmentConfig, FragmentService, InMemoryBackend};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    backend::Backend,
    config::{BackendKind, Config, LogFormat},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub fragment_service: Arc<FragmentService<Backend>>,
    /// Header carrying the authenticated owner id
    pub owner_header: HeaderName,
    /// Public base URL used for `Location` headers
    pub api_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.log_format);

    info!("Starting fragments service");

    let backend = build_backend(&config).await;
    info!(backend = backend.name(), "Storage backend ready");

    let service = FragmentService::new(
        backend,
        FragmentConfig {
            max_payload_size: config.max_payload_size,
        },
    );

    let state = AppState {
        fragment_service: Arc::new(service),
        owner_header: config.owner_header.clone(),
        api_url: config.api_url.clone(),
    };

    // Build HTTP router
    let app = routes::create_router(state);

    let addr = config.bind_address();
    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn build_backend(config: &Config) -> Backend {
    match config.backend {
        BackendKind::Memory => {
            warn!("Using the in-memory backend; fragments are lost on restart");
            Backend::Memory(InMemoryBackend::new())
        }
        BackendKind::Aws => {
            let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            info!(
                bucket = %config.bucket,
                table = %config.table,
                force_path_style = config.force_path_style,
                "Initializing AWS storage backend"
            );

            Backend::Aws(AwsBackend::from_sdk_config(
                &sdk_config,
                AwsBackendConfig {
                    table: config.table.clone(),
                    bucket: config.bucket.clone(),
                    force_path_style: config.force_path_style,
                },
            ))
        }
    }
}
