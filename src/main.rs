use actix_web::web::Data;
use anyhow::Context;
use clap::Parser;
use stack_control::{ControlPlane, api};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Control plane for a front-end web server and its request-processing
/// manager.
#[derive(Debug, Parser)]
#[command(name = "stack-control", version, about)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "control.json")]
    config: PathBuf,

    /// Override the configured API port
    #[arg(long)]
    port: Option<u16>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = stack_control::Config::from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(port) = cli.port {
        config.api.port = port;
    }
    stack_control::config::validate_config(&config)?;

    tracing::info!(
        service = %config.service,
        processes = ?config.group.names(),
        "Control server starting"
    );

    let plane = Data::new(ControlPlane::new(config));

    // Actix handles SIGINT/SIGTERM; once the API stops serving, drain the
    // managed group with the same stop contract before exiting.
    api::serve(plane.clone()).await?;
    plane.shutdown_drain().await;

    tracing::info!("Control server shut down");

    Ok(())
}
