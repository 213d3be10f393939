use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crowdkeys::actuator::build_actuator;
use crowdkeys::core::logging::init_logging;
use crowdkeys::core::{Config, HealthChecker};
use crowdkeys::streaming::{RobotSession, SessionMetrics, TactileEngine};
use crowdkeys::tactile::SessionState;

/// Time the engine gets to release held keys after the session ends.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config.monitoring)?;

    tracing::info!("🚀 Crowd tactile bot starting...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Threshold: {} | Remap: {} ({} entries) | Handler: {}",
        config.tactile.threshold,
        config.tactile.remap,
        config.tactile.remap_table.len(),
        config.tactile.handler
    );

    let actuator = build_actuator(&config.tactile.handler)?;
    let metrics = Arc::new(SessionMetrics::new());
    let health_checker = HealthChecker::new();

    // Start health check endpoint
    let health_clone = health_checker.clone();
    let health_port = config.monitoring.health_port;
    tokio::spawn(async move { start_health_server(health_clone, health_port).await });
    tracing::info!("✅ Health endpoint running on port {}", health_port);

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

    let engine = TactileEngine::new(
        SessionState::new(config.tactile.threshold, config.tactile.remapper()),
        config.tactile.watchdog(),
        actuator,
        metrics.clone(),
        health_checker.clone(),
    );
    let engine_handle = tokio::spawn(engine.run(event_rx, outbound_tx));

    let heartbeat_metrics = metrics.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(60));
        interval.tick().await;
        loop {
            interval.tick().await;
            heartbeat_metrics.print_report();
        }
    });

    // The session owns the only event sender; once it is dropped the engine
    // releases every known key and exits.
    let session = RobotSession::new(config.session.clone(), metrics);
    let result = tokio::select! {
        result = session.run(event_tx, outbound_rx) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
            Ok(())
        }
    };

    match tokio::time::timeout(SHUTDOWN_GRACE, engine_handle).await {
        Ok(Ok(())) => tracing::info!("👋 Keys released, shutting down"),
        Ok(Err(e)) => tracing::error!("Tactile engine failed: {}", e),
        Err(_) => tracing::error!("Tactile engine did not stop within {:?}", SHUTDOWN_GRACE),
    }

    result
}

async fn start_health_server(health_checker: HealthChecker, port: u16) {
    use warp::Filter;

    let health = warp::path("health")
        .and(warp::any().map(move || health_checker.clone()))
        .and_then(|checker: HealthChecker| async move {
            let status = checker.get_status().await;
            Ok::<_, warp::Rejection>(warp::reply::json(&status))
        });

    warp::serve(health).run(([0, 0, 0, 0], port)).await;
}
