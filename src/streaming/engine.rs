use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::metrics::SessionMetrics;
use crate::actuator::Actuator;
use crate::api::RobotFrame;
use crate::core::health::{Component, HealthChecker};
use crate::tactile::{ActuationApplier, Report, ReportProcessor, SessionState, WatchdogOutcome, WatchdogTimer};

#[derive(Debug, Clone)]
pub enum SessionEvent {
    Connected { session_id: String },
    Report(Report),
    Disconnected,
}

/// Owns the session state and serialises reports and watchdog ticks onto one
/// task.
pub struct TactileEngine {
    session: SessionState,
    watchdog: WatchdogTimer,
    actuator: Arc<dyn Actuator>,
    metrics: Arc<SessionMetrics>,
    health: HealthChecker,
}

impl TactileEngine {
    pub fn new(
        session: SessionState,
        watchdog: WatchdogTimer,
        actuator: Arc<dyn Actuator>,
        metrics: Arc<SessionMetrics>,
        health: HealthChecker,
    ) -> Self {
        Self {
            session,
            watchdog,
            actuator,
            metrics,
            health,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<SessionEvent>,
        outbound: mpsc::UnboundedSender<RobotFrame>,
    ) {
        info!(
            "🐕 Watchdog armed: {}ms interval, release after {} silent ticks",
            self.watchdog.interval().as_millis(),
            self.watchdog.miss_limit()
        );

        let mut ticker = time::interval(self.watchdog.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            let was_receiving = self.session.liveness.receiving_reports;

            let frame = tokio::select! {
                event = events.recv() => match event {
                    Some(SessionEvent::Connected { session_id }) => {
                        self.handle_connected(&session_id);
                        self.health.update_component(Component::Session, true).await;
                        self.health.update_component(Component::Actuator, true).await;
                        None
                    }
                    Some(SessionEvent::Report(report)) => self.handle_report(&report),
                    Some(SessionEvent::Disconnected) => {
                        self.handle_disconnected();
                        self.health.update_component(Component::Session, false).await;
                        None
                    }
                    None => break,
                },
                _ = ticker.tick() => {
                    let frame = self.handle_tick();
                    if frame.is_some() {
                        self.health.record_failsafe().await;
                    }
                    frame
                }
            };

            let receiving = self.session.liveness.receiving_reports;
            if receiving != was_receiving {
                self.health.update_component(Component::Reports, receiving).await;
            }

            if let Some(frame) = frame {
                if outbound.send(frame).is_err() {
                    debug!("Outbound channel closed, progress dropped");
                }
            }
        }

        if let Some(frame) = self.shutdown().await {
            if outbound.send(frame).is_err() {
                debug!("Outbound channel closed, release progress dropped");
            }
        }
        info!("Tactile engine stopped");
    }

    /// Runs once the event channel closes: every key still held is released
    /// and queued actuator calls are allowed to finish.
    pub async fn shutdown(&mut self) -> Option<RobotFrame> {
        let held = self.session.registry.entries();
        let echoes = if held.is_empty() {
            Vec::new()
        } else {
            info!("Releasing {} known keys before exit", held.len());
            ActuationApplier::apply_bulk_release(&held, self.session.actuator())
        };
        self.session.detach_actuator();

        if let Some(worker) = self.actuator.close() {
            if let Err(e) = worker.await {
                warn!("Actuator worker ended abnormally: {}", e);
            }
        }

        if echoes.is_empty() {
            return None;
        }
        self.metrics.record_progress(echoes.len());
        Some(RobotFrame::progress(&echoes))
    }

    /// A new connection gets a fresh registry. Keys still held from the
    /// previous connection are released first so none are forgotten while down.
    pub fn handle_connected(&mut self, session_id: &str) {
        let leftover = self.session.registry.entries();
        if !leftover.is_empty() {
            warn!("Releasing {} keys held over from the previous session", leftover.len());
            ActuationApplier::apply_bulk_release(&leftover, self.session.actuator());
        }

        self.session.begin_session();
        self.session.attach_actuator(self.actuator.clone());
        info!("✅ Session {} live", session_id);
    }

    pub fn handle_disconnected(&mut self) {
        warn!("🔌 Session lost, waiting for reconnect");
        self.session.liveness.receiving_reports = false;
    }

    pub fn handle_report(&mut self, report: &Report) -> Option<RobotFrame> {
        self.metrics.record_report(report.is_empty());

        let echoes = ReportProcessor::process(report, &mut self.session);
        if echoes.is_empty() {
            return None;
        }

        self.metrics.record_progress(echoes.len());
        Some(RobotFrame::progress(&echoes))
    }

    pub fn handle_tick(&mut self) -> Option<RobotFrame> {
        match self.watchdog.tick(&mut self.session) {
            WatchdogOutcome::Released(echoes) => {
                self.metrics.increment_failsafe_releases();
                self.metrics.record_progress(echoes.len());
                Some(RobotFrame::progress(&echoes))
            }
            WatchdogOutcome::Silent { missed } => {
                debug!("No reports for {} ticks", missed);
                None
            }
            WatchdogOutcome::Live => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::MockActuator;
    use crate::tactile::{KeyRemapper, LogicalKeyId, VoteRecord};
    use std::time::Duration;

    fn vote_report(key: &str, down: f64, up: f64) -> Report {
        Report {
            votes: vec![VoteRecord::new(LogicalKeyId::new(key), Some(down), Some(up))],
            quorum: 1.0,
        }
    }

    fn engine(actuator: MockActuator) -> TactileEngine {
        TactileEngine::new(
            SessionState::new(0.5, KeyRemapper::disabled()),
            WatchdogTimer::default(),
            Arc::new(actuator),
            Arc::new(SessionMetrics::new()),
            HealthChecker::new(),
        )
    }

    fn lenient_mock() -> MockActuator {
        let mut actuator = MockActuator::new();
        actuator.expect_name().return_const("mock");
        actuator.expect_press().returning(|_| Ok(()));
        actuator.expect_release().returning(|_| Ok(()));
        actuator.expect_close().returning(|| None);
        actuator
    }

    #[test]
    fn test_progress_only_when_echoes() {
        let mut engine = engine(lenient_mock());
        engine.handle_connected("s1");

        assert!(engine.handle_report(&vote_report("w", 0.9, 0.0)).is_some());
        assert!(engine.handle_report(&vote_report("w", 0.5, 0.5)).is_none());
        assert!(engine.handle_report(&Report::default()).is_none());
        assert_eq!(engine.metrics.get_progress_messages_sent(), 1);
    }

    #[test]
    fn test_reconnect_releases_leftovers_and_resets() {
        let mut actuator = MockActuator::new();
        actuator.expect_name().return_const("mock");
        actuator.expect_press().times(1).returning(|_| Ok(()));
        actuator.expect_release().times(1).returning(|_| Ok(()));
        let mut engine = engine(actuator);

        engine.handle_connected("s1");
        engine.handle_report(&vote_report("w", 0.9, 0.0));
        engine.handle_disconnected();
        engine.handle_connected("s2");

        assert!(engine.session().registry.is_empty());
        assert!(engine.session().liveness.receiving_reports);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_fires_failsafe_after_silence() {
        let engine = engine(lenient_mock());
        let metrics = engine.metrics.clone();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(engine.run(event_rx, out_tx));

        event_tx.send(SessionEvent::Connected { session_id: "s1".to_string() }).unwrap();
        event_tx.send(SessionEvent::Report(vote_report("w", 0.9, 0.0))).unwrap();
        event_tx.send(SessionEvent::Report(Report::default())).unwrap();

        let first = out_rx.recv().await.unwrap();
        assert!(matches!(first, RobotFrame::Progress { ref progress } if progress[0].progress == 1));

        time::sleep(Duration::from_millis(2_600)).await;
        let failsafe = out_rx.recv().await.unwrap();
        match failsafe {
            RobotFrame::Progress { progress } => {
                assert_eq!(progress.len(), 1);
                assert_eq!(progress[0].progress, 0);
            }
            other => panic!("unexpected frame {:?}", other),
        }

        time::sleep(Duration::from_secs(5)).await;
        assert!(out_rx.try_recv().is_err());
        assert_eq!(metrics.get_failsafe_releases(), 1);

        drop(event_tx);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_releases_held_keys_when_events_close() {
        let mut actuator = MockActuator::new();
        actuator.expect_name().return_const("mock");
        actuator
            .expect_press()
            .withf(|key| key.as_str() == "w")
            .times(1)
            .returning(|_| Ok(()));
        actuator
            .expect_release()
            .withf(|key| key.as_str() == "w")
            .times(1)
            .returning(|_| Ok(()));
        actuator.expect_close().times(1).returning(|| None);

        let engine = engine(actuator);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(engine.run(event_rx, out_tx));

        event_tx.send(SessionEvent::Connected { session_id: "s1".to_string() }).unwrap();
        event_tx.send(SessionEvent::Report(vote_report("w", 0.9, 0.0))).unwrap();
        drop(event_tx);
        handle.await.unwrap();

        let pressed = out_rx.recv().await.unwrap();
        assert!(matches!(pressed, RobotFrame::Progress { ref progress } if progress[0].progress == 1));
        match out_rx.recv().await.unwrap() {
            RobotFrame::Progress { progress } => {
                assert_eq!(progress.len(), 1);
                assert_eq!(progress[0].progress, 0);
                assert!(!progress[0].fired);
            }
            other => panic!("unexpected frame {:?}", other),
        }
        assert!(out_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_shutdown_without_held_keys_sends_nothing() {
        let mut actuator = MockActuator::new();
        actuator.expect_name().return_const("mock");
        actuator.expect_release().never();
        actuator.expect_close().times(1).returning(|| None);
        let mut engine = engine(actuator);
        engine.handle_connected("s1");

        assert!(engine.shutdown().await.is_none());
    }
}
