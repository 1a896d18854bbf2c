use anyhow::Context;
use clap::Parser;
use postframe::pipeline::Pipeline;
use postframe::rasterizer::{ChromeRasterizer, RasterizerConfig};
use postframe::server::{self, AppState};
use postframe::storage::{CloudinaryStorage, StorageConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Social post image rendering service
#[derive(Debug, Parser)]
#[command(name = "postframe", version)]
struct Args {
    /// Address to bind the HTTP server on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to bind the HTTP server on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Storage account name
    #[arg(long, env = "CLOUDINARY_CLOUD_NAME")]
    cloud_name: String,

    /// Storage API key
    #[arg(long, env = "CLOUDINARY_API_KEY")]
    api_key: String,

    /// Storage API secret
    #[arg(long, env = "CLOUDINARY_API_SECRET", hide_env_values = true)]
    api_secret: String,

    /// Path to the Chrome/Chromium executable; autodetected when omitted
    #[arg(long, env = "CHROME_PATH")]
    chrome_path: Option<PathBuf>,

    /// Directory for transient render artifacts; system temp dir by default
    #[arg(long, env = "SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let scratch_dir = args.scratch_dir.unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&scratch_dir)
        .with_context(|| format!("creating scratch dir {}", scratch_dir.display()))?;

    let rasterizer = ChromeRasterizer::new(RasterizerConfig {
        chrome_path: args.chrome_path,
        ..Default::default()
    });
    let storage = CloudinaryStorage::new(StorageConfig::new(
        args.cloud_name,
        args.api_key,
        args.api_secret,
    ));
    let pipeline = Pipeline::new(Arc::new(rasterizer), Arc::new(storage), scratch_dir);

    let router = server::router(AppState {
        pipeline: Arc::new(pipeline),
    });

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, "postframe listening");

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
