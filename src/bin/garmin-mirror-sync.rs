// ABOUTME: Server binary exposing the sync trigger over HTTP, or running a single sync with --once
// ABOUTME: Loads configuration from the environment and initializes structured logging first
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Garmin Mirror Sync Binary

use anyhow::{Context, Result};
use clap::Parser;
use garmin_mirror_sync::{
    config::environment::ServerConfig, logging, routes, routes::SyncResponse, sync::synchronize,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "garmin-mirror-sync")]
#[command(about = "Mirror recent Garmin Connect activities to the regional instance")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// Run one synchronization, print the result as JSON and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.port {
        config.http_port = port;
    }

    logging::init_from_env()?;
    info!("{}", config.summary());

    if args.once {
        let response = SyncResponse::from(synchronize(&config.sync).await);
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let address = format!("{}:{}", config.host, config.http_port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!(address = %address, "Listening for sync triggers");

    axum::serve(listener, routes::router(Arc::new(config.sync)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
