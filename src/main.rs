use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use lanshare::AppState;
use lanshare::net;
use lanshare::routes;

#[derive(Parser)]
#[command(name = "lanshare", about = "Share local files over the local network via HTTP")]
struct Cli {
    /// Files to share, linked on the index page in the order given
    paths: Vec<PathBuf>,

    /// Port the HTTP server listens on
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Where the ZIP artifact for /download_all is written
    #[arg(long, default_value = "shared_files.zip")]
    archive_path: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lanshare=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let state = AppState::new(cli.archive_path);
    let shared = state.share(cli.paths);

    let addr = format!("0.0.0.0:{}", cli.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    let url = net::share_url(net::local_ip(), cli.port);
    info!(files = shared, %url, "sharing over http");

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutting down");
            signal.cancel();
        }
    });

    axum::serve(listener, routes::app(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("http server")?;

    Ok(())
}
