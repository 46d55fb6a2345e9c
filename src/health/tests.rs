//! Unit tests for health module.

use super::*;
use crate::api::ApiError;
use crate::test_support::{sample_health, FakeBackend};

fn monitor(backend: &Arc<FakeBackend>) -> HealthMonitor {
    HealthMonitor::new(backend.clone(), HealthCheckConfig::default())
}

fn network_error() -> ApiError {
    ApiError::Network("connection refused".to_string())
}

// ============================================================================
// HealthCheckConfig
// ============================================================================

#[test]
fn test_config_default_values() {
    let config = HealthCheckConfig::default();
    assert!(config.enabled);
    assert_eq!(config.interval_seconds, 30);
}

#[test]
fn test_config_partial_toml() {
    let config: HealthCheckConfig = toml::from_str("enabled = false").unwrap();
    assert!(!config.enabled);
    assert_eq!(config.interval_seconds, 30); // default
}

// ============================================================================
// HealthSnapshot
// ============================================================================

#[test]
fn test_snapshot_default_is_connecting() {
    let snapshot = HealthSnapshot::default();
    assert_eq!(snapshot.connection_state(), ConnectionState::Connecting);
    assert!(snapshot.status.is_none());
    assert!(snapshot.last_check_time.is_none());
}

#[test]
fn test_snapshot_failure_before_any_success_is_unreachable() {
    let mut snapshot = HealthSnapshot::default();
    let transition = snapshot.apply_result(Err(network_error()));

    assert_eq!(transition, Some(ConnectionState::Unreachable));
    assert!(snapshot.unreachable);
    assert_eq!(snapshot.consecutive_failures, 1);
    assert!(snapshot.last_error.is_some());
}

#[test]
fn test_snapshot_failure_keeps_last_known_status() {
    let mut snapshot = HealthSnapshot::default();
    assert_eq!(
        snapshot.apply_result(Ok(sample_health("1.0.0"))),
        Some(ConnectionState::Healthy)
    );

    assert_eq!(
        snapshot.apply_result(Err(network_error())),
        Some(ConnectionState::Lost)
    );
    assert_eq!(snapshot.status.as_ref().unwrap().version, "1.0.0");

    // Repeated failure is not a transition
    assert_eq!(snapshot.apply_result(Err(network_error())), None);
    assert_eq!(snapshot.consecutive_failures, 2);
}

#[test]
fn test_snapshot_success_clears_unreachable_and_replaces_status() {
    let mut snapshot = HealthSnapshot::default();
    snapshot.apply_result(Err(network_error()));

    assert_eq!(
        snapshot.apply_result(Ok(sample_health("2.0.0"))),
        Some(ConnectionState::Healthy)
    );
    assert!(!snapshot.unreachable);
    assert!(snapshot.last_error.is_none());
    assert_eq!(snapshot.consecutive_failures, 0);
    assert_eq!(snapshot.status.unwrap().version, "2.0.0");
}

// ============================================================================
// HealthMonitor
// ============================================================================

#[tokio::test]
async fn test_poll_once_success() {
    let backend = Arc::new(FakeBackend::new());
    let monitor = monitor(&backend);

    assert_eq!(monitor.poll_once().await, ConnectionState::Healthy);
    assert_eq!(monitor.status().unwrap().classifier_mode, "hybrid");
    assert!(!monitor.is_unreachable());
}

#[tokio::test]
async fn test_poll_once_failure_after_success_retains_status() {
    let backend = Arc::new(FakeBackend::new());
    let monitor = monitor(&backend);
    monitor.poll_once().await;

    backend.set_health(Err(ApiError::Upstream {
        status: 503,
        message: "HTTP 503".to_string(),
    }));
    assert_eq!(monitor.poll_once().await, ConnectionState::Lost);
    assert!(monitor.is_unreachable());
    assert_eq!(monitor.status().unwrap().version, "1.0.0");
}

#[tokio::test(start_paused = true)]
async fn test_start_polls_immediately_then_on_interval() {
    let backend = Arc::new(FakeBackend::new());
    let monitor = monitor(&backend);

    assert!(monitor.start());
    assert!(monitor.is_running());

    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(backend.health_calls(), 1);
    assert_eq!(monitor.connection_state(), ConnectionState::Healthy);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(backend.health_calls(), 2);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(backend.health_calls(), 3);

    monitor.stop();
}

#[tokio::test(start_paused = true)]
async fn test_stop_halts_polling() {
    let backend = Arc::new(FakeBackend::new());
    let monitor = monitor(&backend);
    monitor.start();
    tokio::time::sleep(Duration::from_millis(1)).await;

    monitor.stop();
    assert!(!monitor.is_running());

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(backend.health_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent_and_safe_before_start() {
    let backend = Arc::new(FakeBackend::new());
    let monitor = monitor(&backend);

    monitor.stop();
    monitor.start();
    monitor.stop();
    monitor.stop();
    assert!(!monitor.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_start_twice_runs_single_loop() {
    let backend = Arc::new(FakeBackend::new());
    let monitor = monitor(&backend);

    assert!(monitor.start());
    assert!(!monitor.start());

    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(backend.health_calls(), 1);
    monitor.stop();
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_stop() {
    let backend = Arc::new(FakeBackend::new());
    let monitor = monitor(&backend);

    monitor.start();
    tokio::time::sleep(Duration::from_millis(1)).await;
    monitor.stop();

    assert!(monitor.start());
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(backend.health_calls(), 2);
    monitor.stop();
}

#[tokio::test(start_paused = true)]
async fn test_drop_stops_polling() {
    let backend = Arc::new(FakeBackend::new());
    {
        let monitor = monitor(&backend);
        monitor.start();
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    tokio::time::sleep(Duration::from_secs(90)).await;
    assert_eq!(backend.health_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_background_failures_flip_unreachable_flag() {
    let backend = Arc::new(FakeBackend::new());
    let monitor = monitor(&backend);
    monitor.start();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(monitor.connection_state(), ConnectionState::Healthy);

    backend.set_health(Err(network_error()));
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(monitor.connection_state(), ConnectionState::Lost);

    backend.set_health(Ok(sample_health("1.1.0")));
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(monitor.connection_state(), ConnectionState::Healthy);
    assert_eq!(monitor.status().unwrap().version, "1.1.0");

    monitor.stop();
}
