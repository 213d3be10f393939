use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

#[derive(Debug)]
pub struct SessionMetrics {
    reports_received: AtomicU64,
    empty_reports: AtomicU64,
    echoes_sent: AtomicU64,
    progress_messages_sent: AtomicU64,
    failsafe_releases: AtomicU64,
    reconnects: AtomicU64,
    parse_errors: AtomicU64,
    start_time: Instant,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            reports_received: AtomicU64::new(0),
            empty_reports: AtomicU64::new(0),
            echoes_sent: AtomicU64::new(0),
            progress_messages_sent: AtomicU64::new(0),
            failsafe_releases: AtomicU64::new(0),
            reconnects: AtomicU64::new(0),
            parse_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_report(&self, empty: bool) {
        self.reports_received.fetch_add(1, Ordering::Relaxed);
        if empty {
            self.empty_reports.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_progress(&self, echoes: usize) {
        self.progress_messages_sent.fetch_add(1, Ordering::Relaxed);
        self.echoes_sent.fetch_add(echoes as u64, Ordering::Relaxed);
    }

    pub fn increment_failsafe_releases(&self) {
        self.failsafe_releases.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_reconnects(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_parse_errors(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_reports_received(&self) -> u64 {
        self.reports_received.load(Ordering::Relaxed)
    }

    pub fn get_empty_reports(&self) -> u64 {
        self.empty_reports.load(Ordering::Relaxed)
    }

    pub fn get_echoes_sent(&self) -> u64 {
        self.echoes_sent.load(Ordering::Relaxed)
    }

    pub fn get_progress_messages_sent(&self) -> u64 {
        self.progress_messages_sent.load(Ordering::Relaxed)
    }

    pub fn get_failsafe_releases(&self) -> u64 {
        self.failsafe_releases.load(Ordering::Relaxed)
    }

    pub fn get_reconnects(&self) -> u64 {
        self.reconnects.load(Ordering::Relaxed)
    }

    pub fn get_parse_errors(&self) -> u64 {
        self.parse_errors.load(Ordering::Relaxed)
    }

    pub fn get_uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Share of reports that carried no votes.
    pub fn get_idle_rate(&self) -> f64 {
        let received = self.get_reports_received();
        if received == 0 {
            0.0
        } else {
            self.get_empty_reports() as f64 / received as f64
        }
    }

    pub fn get_snapshot(&self) -> HashMap<String, serde_json::Value> {
        let mut snapshot = HashMap::new();

        snapshot.insert("reports_received".to_string(), serde_json::json!(self.get_reports_received()));
        snapshot.insert("empty_reports".to_string(), serde_json::json!(self.get_empty_reports()));
        snapshot.insert("echoes_sent".to_string(), serde_json::json!(self.get_echoes_sent()));
        snapshot.insert(
            "progress_messages_sent".to_string(),
            serde_json::json!(self.get_progress_messages_sent()),
        );
        snapshot.insert("failsafe_releases".to_string(), serde_json::json!(self.get_failsafe_releases()));
        snapshot.insert("reconnects".to_string(), serde_json::json!(self.get_reconnects()));
        snapshot.insert("parse_errors".to_string(), serde_json::json!(self.get_parse_errors()));
        snapshot.insert("idle_rate".to_string(), serde_json::json!(self.get_idle_rate()));
        snapshot.insert("uptime_secs".to_string(), serde_json::json!(self.get_uptime_secs()));

        snapshot
    }

    pub fn print_report(&self) {
        tracing::info!(
            "📊 reports: {} ({:.1}% idle) | echoes: {} in {} messages | failsafe releases: {} | reconnects: {} | uptime: {}s",
            self.get_reports_received(),
            self.get_idle_rate() * 100.0,
            self.get_echoes_sent(),
            self.get_progress_messages_sent(),
            self.get_failsafe_releases(),
            self.get_reconnects(),
            self.get_uptime_secs(),
        );
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization() {
        let metrics = SessionMetrics::new();
        assert_eq!(metrics.get_reports_received(), 0);
        assert_eq!(metrics.get_idle_rate(), 0.0);
    }

    #[test]
    fn test_report_counting() {
        let metrics = SessionMetrics::new();
        metrics.record_report(false);
        metrics.record_report(true);
        metrics.record_report(false);
        metrics.record_report(true);

        assert_eq!(metrics.get_reports_received(), 4);
        assert_eq!(metrics.get_empty_reports(), 2);
        assert_eq!(metrics.get_idle_rate(), 0.5);
    }

    #[test]
    fn test_progress_counting() {
        let metrics = SessionMetrics::new();
        metrics.record_progress(3);
        metrics.record_progress(2);

        let snapshot = metrics.get_snapshot();
        assert_eq!(snapshot["echoes_sent"], serde_json::json!(5));
        assert_eq!(snapshot["progress_messages_sent"], serde_json::json!(2));
    }
}
