use std::time::Duration;

use super::applier::ActuationApplier;
use super::session::SessionState;
use super::types::ProgressEcho;

pub const DEFAULT_WATCHDOG_INTERVAL: Duration = Duration::from_millis(500);

/// Consecutive silent ticks before every known key is released (2.5s at the
/// default interval).
pub const DEFAULT_MISS_LIMIT: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchdogOutcome {
    Live,
    Silent { missed: u32 },
    Released(Vec<ProgressEcho>),
}

/// Liveness check on the vote stream.
///
/// The release fires when the miss counter reaches the limit exactly. The
/// counter keeps climbing afterwards, so a long silence releases once; only a
/// tick that sees reports flowing again re-arms it.
#[derive(Debug, Clone, Copy)]
pub struct WatchdogTimer {
    interval: Duration,
    miss_limit: u32,
}

impl Default for WatchdogTimer {
    fn default() -> Self {
        Self::new(DEFAULT_WATCHDOG_INTERVAL, DEFAULT_MISS_LIMIT)
    }
}

impl WatchdogTimer {
    pub fn new(interval: Duration, miss_limit: u32) -> Self {
        Self {
            interval,
            miss_limit,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn miss_limit(&self) -> u32 {
        self.miss_limit
    }

    pub fn tick(&self, session: &mut SessionState) -> WatchdogOutcome {
        if session.liveness.receiving_reports {
            session.liveness.consecutive_miss_ticks = 0;
            return WatchdogOutcome::Live;
        }

        let missed = session.liveness.consecutive_miss_ticks.saturating_add(1);
        session.liveness.consecutive_miss_ticks = missed;

        if missed == self.miss_limit {
            let keys = session.registry.entries();
            tracing::warn!(
                "🛑 Clearing player input due to lack of reports ({} keys)",
                keys.len()
            );
            let echoes = ActuationApplier::apply_bulk_release(&keys, session.actuator());
            return WatchdogOutcome::Released(echoes);
        }

        WatchdogOutcome::Silent { missed }
    }
}
