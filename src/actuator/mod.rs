pub mod handlers;

use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::tactile::PhysicalKeyId;

pub use handlers::{LogActuator, XdotoolActuator};

pub const HANDLERS: &[&str] = &["xdotool", "log"];

#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Exit { program: String, status: String },

    #[error("{0} command queue is closed")]
    QueueClosed(&'static str),

    #[error("unknown key handler '{0}'")]
    UnknownHandler(String),
}

/// Something that can hold down and let go of keys on the controlled machine.
///
/// Calls must return promptly and take effect in the order they were made.
/// Pressing an already pressed key, or releasing one that is up, is harmless.
#[cfg_attr(test, mockall::automock)]
pub trait Actuator: Send + Sync {
    fn press(&self, key: &PhysicalKeyId) -> Result<(), ActuatorError>;
    fn release(&self, key: &PhysicalKeyId) -> Result<(), ActuatorError>;
    fn name(&self) -> &'static str;

    /// Stops accepting calls. The returned task finishes once every call
    /// already accepted has been carried out.
    fn close(&self) -> Option<JoinHandle<()>> {
        None
    }
}

pub fn build_actuator(handler: &str) -> Result<Arc<dyn Actuator>, ActuatorError> {
    match handler {
        "xdotool" => Ok(Arc::new(XdotoolActuator::new())),
        "log" => Ok(Arc::new(LogActuator)),
        other => Err(ActuatorError::UnknownHandler(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The xdotool handler starts its command worker on the runtime.
    #[tokio::test]
    async fn test_build_known_handlers() {
        for handler in HANDLERS {
            let actuator = build_actuator(handler).unwrap();
            assert_eq!(actuator.name(), *handler);
        }
    }

    #[test]
    fn test_unknown_handler_rejected() {
        let err = build_actuator("robotjs").err().unwrap();
        assert!(matches!(err, ActuatorError::UnknownHandler(ref h) if h == "robotjs"));
    }
}
