//! Sockshake - SOCKS5 proxy checker
//!
//! Connects to a SOCKS5 proxy, negotiates a CONNECT to the given
//! destination, and reports the outcome. A smoke tool for the negotiation
//! engine.

use anyhow::{Context, Result};
use clap::Parser;
use sockshake::{Credentials, Endpoint, Negotiation, NegotiationStatus, TokioEventManager};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Sockshake - negotiate a SOCKS5 CONNECT through a proxy and report the result
#[derive(Parser, Debug)]
#[command(name = "sockshake")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Proxy address (host:port)
    proxy: String,

    /// Destination hostname or IPv4 literal
    host: String,

    /// Destination port
    port: u16,

    /// Username for username/password authentication
    #[arg(short, long)]
    username: Option<String>,

    /// Password for username/password authentication
    #[arg(short, long, default_value = "")]
    password: String,

    /// Negotiation timeout in seconds (0 disables the timer)
    #[arg(short, long, default_value = "30")]
    timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args.log_level)?;

    info!("Sockshake v{}", sockshake::VERSION);
    info!("Proxy: {}", args.proxy);

    let destination = Endpoint::new(args.host.clone(), args.port);
    info!("Destination: {}", destination);

    let stream = TcpStream::connect(&args.proxy)
        .await
        .with_context(|| format!("Failed to connect to proxy {}", args.proxy))?;
    debug!("TCP connection to proxy established");

    let manager = Arc::new(TokioEventManager::new());
    let socket = Arc::new(manager.attach(stream));

    let (tx, rx) = tokio::sync::oneshot::channel();
    let tx = Mutex::new(Some(tx));
    let mut builder = Negotiation::builder(socket, manager, destination, move |status, detail| {
        if let Some(tx) = tx.lock().unwrap_or_else(|p| p.into_inner()).take() {
            let _ = tx.send((status, detail));
        }
    });

    if let Some(username) = &args.username {
        builder = builder.credentials(Credentials::new(username.as_bytes(), args.password.as_bytes()));
    }
    if args.timeout != 0 {
        builder = builder.timeout(Duration::from_secs(args.timeout));
    }

    let negotiation = builder.build();
    negotiation
        .start()
        .with_context(|| "Failed to send the method request")?;

    let (status, detail) = rx.await.with_context(|| "Negotiation callback dropped")?;
    match status {
        NegotiationStatus::Success => {
            info!("Negotiation succeeded: {}", detail);
            Ok(())
        }
        NegotiationStatus::Error => {
            anyhow::bail!("Negotiation failed: {}", detail)
        }
    }
}

/// Setup logging with the given level, overridable via `RUST_LOG`
fn setup_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log level: {}", level))?;

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}
