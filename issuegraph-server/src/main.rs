use std::sync::Arc;

use clap::Parser;
use issuegraph_core::IssueGraphConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use issuegraph_server::browser;
use issuegraph_server::http::{self, HttpState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "ISSUEGRAPH_CONFIG", default_value = "issuegraph.toml")]
    config: String,

    /// Listen host (overrides [server] host)
    #[arg(short, long, env = "ISSUEGRAPH_HOST")]
    netloc: Option<String>,

    /// Listen port (overrides [server] port)
    #[arg(short, long, env = "ISSUEGRAPH_PORT")]
    port: Option<u16>,

    /// Initial search, only used to pre-fill the browser URL
    #[arg(short, long, default_value = "")]
    search: String,

    /// Do not open a browser once the server is listening
    #[arg(long)]
    no_browser: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Init logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    // Load config
    let mut config = match IssueGraphConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };
    if let Some(host) = args.netloc {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.no_browser {
        config.server.open_browser = false;
    }

    let source = match issuegraph_core::source::source_from_config(&config.data) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to set up issue source: {}", e);
            std::process::exit(1);
        }
    };

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    let port = listener.local_addr()?.port();

    if config.server.open_browser {
        let url = browser::viewer_url(&config.server.host, port, &args.search);
        tokio::spawn(async move {
            if let Err(e) = browser::open(&url).await {
                tracing::warn!("Could not open browser at {}: {}", url, e);
            }
        });
    }

    let state = Arc::new(HttpState {
        config,
        source: Arc::from(source),
    });

    let mut shutdown = tx.subscribe();
    http::serve(listener, state, async move {
        let _ = shutdown.recv().await;
    })
    .await?;

    Ok(())
}
