//! HTTP host for the BPMN ↔ PNML transformation core.
//!
//! Bootstraps logging, loads configuration, wires the rate limiter and
//! metrics registry into shared state, and serves the router built in
//! `http`. The transformation logic itself lives entirely in
//! `bpmn-pnml-core`; this binary is pure plumbing.

mod config;
mod http;
mod metrics;
mod ratelimit;

use config::Config;
use http::AppState;
use metrics::Metrics;
use ratelimit::RequestGate;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bpmn_pnml_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(addr = %config.addr, k_service = ?config.k_service, "starting bpmn-pnml-server");

    let gate = RequestGate::new(config.k_service.is_some(), config.rate_limit_per_minute);
    let metrics = Metrics::new()?;
    let state = Arc::new(AppState { metrics, gate });

    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!("listening");
    axum::serve(listener, router).await?;
    Ok(())
}
