use std::sync::Arc;

use super::registry::KnownKeysRegistry;
use super::remap::KeyRemapper;
use crate::actuator::Actuator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessState {
    pub receiving_reports: bool,
    pub consecutive_miss_ticks: u32,
}

impl Default for LivenessState {
    fn default() -> Self {
        Self {
            receiving_reports: true,
            consecutive_miss_ticks: 0,
        }
    }
}

/// All mutable state shared by the report path and the watchdog.
///
/// Owned by a single task; both event sources borrow it mutably in turn, so
/// no locking is needed.
pub struct SessionState {
    threshold: f64,
    remapper: KeyRemapper,
    pub registry: KnownKeysRegistry,
    pub liveness: LivenessState,
    actuator: Option<Arc<dyn Actuator>>,
}

impl SessionState {
    /// `threshold` must lie in (0, 1]; config validation guarantees it.
    pub fn new(threshold: f64, remapper: KeyRemapper) -> Self {
        debug_assert!(threshold > 0.0 && threshold <= 1.0);
        Self {
            threshold,
            remapper,
            registry: KnownKeysRegistry::new(),
            liveness: LivenessState::default(),
            actuator: None,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn remapper(&self) -> &KeyRemapper {
        &self.remapper
    }

    pub fn actuator(&self) -> Option<&dyn Actuator> {
        self.actuator.as_deref()
    }

    pub fn attach_actuator(&mut self, actuator: Arc<dyn Actuator>) {
        tracing::info!("🎮 Actuator attached: {}", actuator.name());
        self.actuator = Some(actuator);
    }

    pub fn detach_actuator(&mut self) -> Option<Arc<dyn Actuator>> {
        self.actuator.take()
    }

    /// Fresh registry and liveness for a new connection; settings and the
    /// actuator carry over.
    pub fn begin_session(&mut self) {
        self.registry = KnownKeysRegistry::new();
        self.liveness = LivenessState::default();
    }
}
