use super::types::{Decision, LogicalKeyId, PhysicalKeyId, ProgressEcho};
use crate::actuator::Actuator;

/// Pushes decisions to the actuator and builds the matching progress echoes.
///
/// A missing actuator is not an error: the echo is still produced so voters
/// see the outcome, nothing is injected. Actuator failures are logged and
/// swallowed for the same reason.
pub struct ActuationApplier;

impl ActuationApplier {
    pub fn apply(
        code: &LogicalKeyId,
        physical: &PhysicalKeyId,
        decision: Decision,
        actuator: Option<&dyn Actuator>,
    ) -> Option<ProgressEcho> {
        let pressed = match decision {
            Decision::Press => true,
            Decision::Release => false,
            Decision::NoChange => return None,
        };

        if let Some(actuator) = actuator {
            let result = if pressed {
                actuator.press(physical)
            } else {
                actuator.release(physical)
            };
            if let Err(e) = result {
                tracing::warn!(key = %physical, handler = actuator.name(), "⚠️  actuator failed: {}", e);
            }
        } else {
            tracing::debug!(key = %physical, ?decision, "no actuator attached, skipping injection");
        }

        Some(ProgressEcho::new(code.clone(), pressed))
    }

    pub fn apply_bulk_release(
        keys: &[(LogicalKeyId, PhysicalKeyId)],
        actuator: Option<&dyn Actuator>,
    ) -> Vec<ProgressEcho> {
        keys.iter()
            .filter_map(|(code, physical)| Self::apply(code, physical, Decision::Release, actuator))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::{ActuatorError, MockActuator};
    use mockall::predicate::eq;

    fn key(name: &str) -> (LogicalKeyId, PhysicalKeyId) {
        let logical = LogicalKeyId::new(name);
        let physical = PhysicalKeyId::from(&logical);
        (logical, physical)
    }

    #[test]
    fn test_press_calls_actuator() {
        let (code, physical) = key("w");
        let mut actuator = MockActuator::new();
        actuator.expect_press().with(eq(physical.clone())).times(1).returning(|_| Ok(()));
        actuator.expect_release().never();

        let echo = ActuationApplier::apply(&code, &physical, Decision::Press, Some(&actuator)).unwrap();
        assert_eq!(echo.progress, 1);
        assert!(echo.fired);
    }

    #[test]
    fn test_no_change_is_silent() {
        let (code, physical) = key("w");
        let mut actuator = MockActuator::new();
        actuator.expect_press().never();
        actuator.expect_release().never();

        assert!(ActuationApplier::apply(&code, &physical, Decision::NoChange, Some(&actuator)).is_none());
    }

    #[test]
    fn test_unattached_actuator_still_echoes() {
        let (code, physical) = key("a");
        let echo = ActuationApplier::apply(&code, &physical, Decision::Release, None).unwrap();
        assert_eq!(echo.progress, 0);
        assert!(!echo.fired);
    }

    #[test]
    fn test_actuator_failure_is_swallowed() {
        let (code, physical) = key("d");
        let mut actuator = MockActuator::new();
        actuator.expect_name().return_const("mock");
        actuator.expect_release().times(1).returning(|_| {
            Err(ActuatorError::UnknownHandler("gone".to_string()))
        });

        let echo = ActuationApplier::apply(&code, &physical, Decision::Release, Some(&actuator));
        assert!(echo.is_some());
    }

    #[test]
    fn test_bulk_release_echoes_every_key() {
        let keys = vec![key("a"), key("s"), key("d")];
        let mut actuator = MockActuator::new();
        actuator.expect_release().times(3).returning(|_| Ok(()));
        actuator.expect_press().never();

        let echoes = ActuationApplier::apply_bulk_release(&keys, Some(&actuator));
        assert_eq!(echoes.len(), 3);
        assert!(echoes.iter().all(|e| e.progress == 0 && !e.fired));
    }
}
