use clap::Parser;
use sceneshot::handlers::AppState;
use sceneshot::{server, ChromeRenderer, RendererConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Render fabric.js canvas scenes to images over HTTP
#[derive(Debug, Parser)]
#[command(name = "sceneshot", version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Path to the Chrome/Chromium binary (autodetected when omitted)
    #[arg(long)]
    chrome: Option<PathBuf>,

    /// Bound on bootstrap page load, in milliseconds
    #[arg(long, default_value_t = 10_000)]
    content_load_timeout_ms: u64,

    /// Bound on the in-page render completion wait, in milliseconds
    #[arg(long, default_value_t = 15_000)]
    completion_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = RendererConfig {
        content_load_timeout: Duration::from_millis(args.content_load_timeout_ms),
        completion_timeout: Duration::from_millis(args.completion_timeout_ms),
        chrome_binary: args.chrome,
    };

    let state = AppState {
        renderer: Arc::new(ChromeRenderer::new(config)),
    };

    server::run_server(args.bind, state).await
}
