mod auth;
mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod projection;
mod repository;
mod routes;
mod scope;
mod state;
mod storage;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::{PasswordService, TokenService};
use crate::config::{Config, S3Config, StorageBackend};
use crate::db::create_pool;
use crate::repository::{MemoryRepository, PgRepository, Repository};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{BlobStore, MemoryBlobStore, S3BlobStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobboard API v{}", env!("CARGO_PKG_VERSION"));

    let (repo, blobs): (Arc<dyn Repository>, Arc<dyn BlobStore>) = match config.backend {
        StorageBackend::Postgres => {
            let database = config
                .database
                .as_ref()
                .context("DATABASE_URL is required for the postgres backend")?;
            let s3 = config
                .s3
                .as_ref()
                .context("S3 settings are required for the postgres backend")?;

            let pool = create_pool(database).await?;
            let client = build_s3_client(s3).await;
            info!("S3 client initialized (bucket: {})", s3.bucket);

            (
                Arc::new(PgRepository::new(pool)),
                Arc::new(S3BlobStore::new(client, s3.bucket.clone())),
            )
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; all data is lost on shutdown");
            (
                Arc::new(MemoryRepository::new()),
                Arc::new(MemoryBlobStore::new()),
            )
        }
    };

    let tokens = TokenService::new(
        &config.jwt_secret,
        config.access_token_ttl,
        config.refresh_token_ttl,
    )?;
    let passwords = PasswordService::default();

    if let Some(admin) = &config.admin {
        auth::handlers::ensure_admin(repo.as_ref(), &passwords, &admin.username, &admin.password)
            .await
            .context("Failed to bootstrap admin account")?;
    }

    // Build app state
    let state = AppState {
        repo,
        blobs,
        tokens,
        passwords,
        max_upload_bytes: config.max_upload_bytes,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &S3Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.access_key_id,
        &config.secret_access_key,
        None,
        None,
        "jobboard-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
