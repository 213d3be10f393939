use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{Actuator, ActuatorError};
use crate::tactile::PhysicalKeyId;

#[derive(Debug, Clone, PartialEq, Eq)]
struct KeyCommand {
    action: &'static str,
    keysym: String,
}

/// Injects keys on an X11 desktop through `xdotool keydown/keyup`.
///
/// Calls are queued and a single worker runs them one at a time, so a
/// release can never overtake the press before it. Must be created inside a
/// Tokio runtime.
#[derive(Debug)]
pub struct XdotoolActuator {
    queue: Mutex<Option<mpsc::UnboundedSender<KeyCommand>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl XdotoolActuator {
    pub fn new() -> Self {
        Self::with_program("xdotool")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        let program = program.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(drain(rx, move |cmd| {
            let program = program.clone();
            async move { run_command(&program, &cmd).await }
        }));

        Self {
            queue: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    fn send(&self, action: &'static str, key: &PhysicalKeyId) -> Result<(), ActuatorError> {
        let command = KeyCommand {
            action,
            keysym: keysym(key.as_str()),
        };
        match lock(&self.queue).as_ref() {
            Some(queue) => queue
                .send(command)
                .map_err(|_| ActuatorError::QueueClosed("xdotool")),
            None => Err(ActuatorError::QueueClosed("xdotool")),
        }
    }
}

impl Actuator for XdotoolActuator {
    fn press(&self, key: &PhysicalKeyId) -> Result<(), ActuatorError> {
        self.send("keydown", key)
    }

    fn release(&self, key: &PhysicalKeyId) -> Result<(), ActuatorError> {
        self.send("keyup", key)
    }

    fn name(&self) -> &'static str {
        "xdotool"
    }

    fn close(&self) -> Option<JoinHandle<()>> {
        lock(&self.queue).take();
        lock(&self.worker).take()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Runs queued commands in arrival order until every sender is gone.
async fn drain<F, Fut>(mut rx: mpsc::UnboundedReceiver<KeyCommand>, mut run: F)
where
    F: FnMut(KeyCommand) -> Fut,
    Fut: Future<Output = Result<(), ActuatorError>>,
{
    while let Some(command) = rx.recv().await {
        debug!(action = command.action, keysym = %command.keysym, "xdotool");
        if let Err(e) = run(command).await {
            warn!("Key injection failed: {}", e);
        }
    }
}

async fn run_command(program: &str, command: &KeyCommand) -> Result<(), ActuatorError> {
    let status = Command::new(program)
        .arg(command.action)
        .arg(&command.keysym)
        .status()
        .await
        .map_err(|source| ActuatorError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(ActuatorError::Exit {
            program: program.to_string(),
            status: status.to_string(),
        })
    }
}

/// X keysym for a canonical key name.
fn keysym(name: &str) -> String {
    match name {
        "enter" => "Return".to_string(),
        "space" => "space".to_string(),
        "up" => "Up".to_string(),
        "down" => "Down".to_string(),
        "left" => "Left".to_string(),
        "right" => "Right".to_string(),
        "shift" => "Shift_L".to_string(),
        "ctrl" => "Control_L".to_string(),
        "alt" => "Alt_L".to_string(),
        "esc" => "Escape".to_string(),
        "tab" => "Tab".to_string(),
        "backspace" => "BackSpace".to_string(),
        n if n.starts_with("numpad ") => format!("KP_{}", &n["numpad ".len()..]),
        f if f.len() > 1 && f.starts_with('f') && f[1..].chars().all(|c| c.is_ascii_digit()) => {
            f.to_uppercase()
        }
        other => other.to_string(),
    }
}

/// Dry-run handler: decisions are only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogActuator;

impl Actuator for LogActuator {
    fn press(&self, key: &PhysicalKeyId) -> Result<(), ActuatorError> {
        tracing::info!(key = %key, "⬇️  press");
        Ok(())
    }

    fn release(&self, key: &PhysicalKeyId) -> Result<(), ActuatorError> {
        tracing::info!(key = %key, "⬆️  release");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_keysym_translation() {
        assert_eq!(keysym("enter"), "Return");
        assert_eq!(keysym("f5"), "F5");
        assert_eq!(keysym("w"), "w");
        assert_eq!(keysym("1"), "1");
        assert_eq!(keysym("numpad 7"), "KP_7");
        assert_eq!(keysym("bracketleft"), "bracketleft");
    }

    #[test]
    fn test_log_actuator_never_fails() {
        let key = PhysicalKeyId::new("w");
        assert!(LogActuator.press(&key).is_ok());
        assert!(LogActuator.release(&key).is_ok());
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let command = KeyCommand {
            action: "keydown",
            keysym: "w".to_string(),
        };
        let err = run_command("definitely-not-installed-xdotool", &command)
            .await
            .unwrap_err();
        assert!(matches!(err, ActuatorError::Spawn { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_run_in_call_order() {
        let (tx, rx) = mpsc::unbounded_channel();
        let done = Arc::new(Mutex::new(Vec::new()));
        let seen = done.clone();

        // The press takes longer than the release queued right behind it.
        let worker = tokio::spawn(drain(rx, move |cmd: KeyCommand| {
            let seen = seen.clone();
            async move {
                let delay = if cmd.action == "keydown" { 50 } else { 1 };
                tokio::time::sleep(Duration::from_millis(delay)).await;
                seen.lock().unwrap().push(cmd.action);
                Ok::<(), ActuatorError>(())
            }
        }));

        for action in ["keydown", "keyup", "keydown", "keyup"] {
            tx.send(KeyCommand {
                action,
                keysym: "w".to_string(),
            })
            .unwrap();
        }
        drop(tx);
        worker.await.unwrap();

        assert_eq!(*done.lock().unwrap(), vec!["keydown", "keyup", "keydown", "keyup"]);
    }

    #[tokio::test]
    async fn test_closed_actuator_rejects_calls() {
        let actuator = XdotoolActuator::with_program("definitely-not-installed-xdotool");
        let key = PhysicalKeyId::new("w");

        // Accepted even though the program is missing; the worker logs it.
        assert!(actuator.press(&key).is_ok());

        let worker = actuator.close().unwrap();
        worker.await.unwrap();

        assert!(matches!(
            actuator.release(&key),
            Err(ActuatorError::QueueClosed("xdotool"))
        ));
        assert!(actuator.close().is_none());
    }
}
