use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: ComponentHealth,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub session: bool,
    pub actuator: bool,
    pub receiving_reports: bool,
    pub last_report_at: Option<DateTime<Utc>>,
    pub last_failsafe_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Session,
    Actuator,
    Reports,
}

#[derive(Clone)]
pub struct HealthChecker {
    start_time: std::time::Instant,
    status: Arc<RwLock<ComponentHealth>>,
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {
            start_time: std::time::Instant::now(),
            status: Arc::new(RwLock::new(ComponentHealth::default())),
        }
    }

    pub async fn get_status(&self) -> HealthStatus {
        let components = self.status.read().await.clone();

        HealthStatus {
            status: if components.session && components.actuator {
                "healthy".to_string()
            } else {
                "degraded".to_string()
            },
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            components,
        }
    }

    pub async fn update_component(&self, component: Component, healthy: bool) {
        let mut status = self.status.write().await;
        match component {
            Component::Session => status.session = healthy,
            Component::Actuator => status.actuator = healthy,
            Component::Reports => {
                status.receiving_reports = healthy;
                if healthy {
                    status.last_report_at = Some(Utc::now());
                }
            }
        }
    }

    pub async fn record_failsafe(&self) {
        self.status.write().await.last_failsafe_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_degraded_until_connected() {
        let checker = HealthChecker::new();
        assert_eq!(checker.get_status().await.status, "degraded");

        checker.update_component(Component::Session, true).await;
        checker.update_component(Component::Actuator, true).await;
        assert_eq!(checker.get_status().await.status, "healthy");
    }

    #[tokio::test]
    async fn test_report_timestamps() {
        let checker = HealthChecker::new();
        checker.update_component(Component::Reports, true).await;
        checker.record_failsafe().await;

        let status = checker.get_status().await;
        assert!(status.components.receiving_reports);
        assert!(status.components.last_report_at.is_some());
        assert!(status.components.last_failsafe_at.is_some());
    }
}
