use super::applier::ActuationApplier;
use super::evaluator::decide;
use super::session::SessionState;
use super::types::{ProgressEcho, Report};

/// Runs one report through remap, decision, registration and actuation.
pub struct ReportProcessor;

impl ReportProcessor {
    /// Returns the echoes for the report, in vote order. An empty report only
    /// marks the stream as silent for the watchdog.
    pub fn process(report: &Report, session: &mut SessionState) -> Vec<ProgressEcho> {
        if report.is_empty() {
            session.liveness.receiving_reports = false;
            return Vec::new();
        }
        session.liveness.receiving_reports = true;

        let mut echoes = Vec::with_capacity(report.votes.len());
        for vote in &report.votes {
            let physical = session.remapper().remap(&vote.key);
            let decision = decide(vote, session.threshold());
            session.registry.record(&vote.key, &physical);

            tracing::debug!(key = %vote.key, physical = %physical, ?decision, "vote decided");

            if let Some(echo) =
                ActuationApplier::apply(&vote.key, &physical, decision, session.actuator())
            {
                echoes.push(echo);
            }
        }

        echoes
    }
}
