use std::path::PathBuf;
use std::sync::Arc;

use burrow::config::Config;
use burrow::fs::{Dir, FileServer};
use burrow::server::{Router, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config::load()?;

    let root = cfg.files.root.clone().unwrap_or_else(|| PathBuf::from("."));
    tracing::info!(root = %root.display(), "Serving files");

    let router = Router::new();
    router.handle("/", FileServer::new(Dir::new(root)))?;

    let server = Server::new(cfg.server).with_handler(Arc::new(router));

    tokio::select! {
        res = server.listen_and_serve() => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
