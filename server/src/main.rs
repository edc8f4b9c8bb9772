use anyhow::Result;
use axum::Router;
use clap::Parser;
use engine::catalog::{DEFAULT_SAMPLE_SEED, DEFAULT_SAMPLE_SIZE};
use server::{build_app, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Catalog file (.csv, .json or .jsonl)
    #[arg(long, default_value = "./dataset.csv")]
    catalog: PathBuf,
    /// File that user feedback is appended to
    #[arg(long, default_value = "./feedback.log")]
    feedback_log: PathBuf,
    /// Maximum rows to index, drawn by a seeded sample (0 = all rows)
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    sample: usize,
    /// Seed for the row sample
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SEED)]
    seed: u64,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = ServerConfig {
        catalog: args.catalog,
        feedback_log: args.feedback_log,
        admin_token: std::env::var("ADMIN_TOKEN").ok(),
        sample: args.sample,
        seed: args.seed,
    };
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
