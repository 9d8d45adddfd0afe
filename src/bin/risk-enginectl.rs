//! Operator CLI for the risk-scoring engine: schema bootstrap and a
//! standalone decay scheduler run, for deployments that run decay as its
//! own process rather than embedded in the ingestion service.
//!
//! ```bash
//! risk-enginectl bootstrap-schema
//! risk-enginectl run-decay
//! ```

use risk_core::Config;
use risk_engine::RiskEngine;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let command = std::env::args().nth(1).unwrap_or_default();

    match command.as_str() {
        "bootstrap-schema" => bootstrap_schema().await,
        "run-decay" => run_decay().await,
        _ => {
            eprintln!("usage: risk-enginectl <bootstrap-schema|run-decay>");
            std::process::exit(2);
        }
    }
}

async fn bootstrap_schema() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let engine = RiskEngine::connect(config).await?;
    tracing::info!("schema bootstrapped");
    drop(engine);
    Ok(())
}

async fn run_decay() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut engine = RiskEngine::connect(config).await?;
    engine.start_decay_scheduler();

    tracing::info!("decay scheduler running, press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;

    tracing::info!("shutdown signal received");
    engine.shutdown().await;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "risk_engine=info,risk_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
