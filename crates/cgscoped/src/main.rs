//! cgscoped - cgscope report daemon.
//!
//! Serves the cgroup report as an HTML page on a single route.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cgscope::ProbeConfig;

mod api;
mod html;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// HTTP port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Seconds to wait between the two CPU usage samples
    #[arg(long, default_value_t = 2.0)]
    interval: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = ProbeConfig {
        sample_interval: Duration::from_secs_f64(args.interval),
        ..ProbeConfig::default()
    };

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], args.port));
    let app = api::server::app(config);

    tracing::info!("cgscoped listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
