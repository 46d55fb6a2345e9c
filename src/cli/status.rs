//! `health` and `metrics` command implementations

use crate::api::{HttpBackend, RouterBackend};
use crate::cli::output::{
    format_health, format_health_json, format_metrics_json, format_metrics_table, HealthView,
};
use crate::cli::StatusArgs;
use crate::config::ClientConfig;
use crate::health::{ConnectionState, HealthMonitor};
use crate::metrics::MetricsPoller;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

fn backend(config: &ClientConfig) -> anyhow::Result<Arc<dyn RouterBackend>> {
    let backend = HttpBackend::new(
        &config.server.base_url,
        Duration::from_secs(config.server.poll_timeout_seconds),
    )
    .context("failed to build HTTP client")?;
    Ok(Arc::new(backend))
}

/// Poll `/health` once and render the result.
///
/// Fails when the backend could not be reached so scripts can check the exit code.
pub async fn handle_health(args: &StatusArgs, config: &ClientConfig) -> anyhow::Result<String> {
    let monitor = HealthMonitor::new(backend(config)?, config.health_check.clone());
    let state = monitor.poll_once().await;
    let view = HealthView::from(&monitor.snapshot());

    let output = if args.json {
        format_health_json(&view)
    } else {
        format_health(&view)
    };

    if state != ConnectionState::Healthy {
        println!("{}", output);
        anyhow::bail!("router backend at {} is unreachable", config.server.base_url);
    }
    Ok(output)
}

/// Fetch `/metrics` once and render the summary.
pub async fn handle_metrics(args: &StatusArgs, config: &ClientConfig) -> anyhow::Result<String> {
    let poller = MetricsPoller::new(backend(config)?);
    if !poller.refresh().await {
        anyhow::bail!("failed to fetch metrics from {}", config.server.base_url);
    }
    let summary = poller.summary().unwrap_or_default();

    Ok(if args.json {
        format_metrics_json(&summary)
    } else {
        format_metrics_table(&summary)
    })
}
