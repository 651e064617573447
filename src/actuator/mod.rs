// src/actuator/mod.rs - Motion command model and the actuator port seam
pub mod mock;
pub mod robonect;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("actuator backend unavailable: {0}")]
    BackendUnavailable(String),
}

/// Pivot side for an end-of-row turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    pub fn flipped(self) -> Self {
        match self {
            TurnDirection::Left => TurnDirection::Right,
            TurnDirection::Right => TurnDirection::Left,
        }
    }
}

impl fmt::Display for TurnDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnDirection::Left => write!(f, "left"),
            TurnDirection::Right => write!(f, "right"),
        }
    }
}

/// One motion primitive. Backends translate the kind into their own wire
/// form; the engine never speaks wheel powers directly.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    Forward,
    Reverse,
    RotateInPlace {
        radius_cm: f64,
        direction: TurnDirection,
    },
    Stop,
}

/// A motion command as issued to the actuator port. Immutable once built;
/// every issued command lands in the dispatcher's log.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub kind: CommandKind,
    pub duration: Duration,
    pub power: u8,
}

impl Command {
    pub fn forward(duration: Duration, power: u8) -> Self {
        Self {
            kind: CommandKind::Forward,
            duration,
            power,
        }
    }

    pub fn reverse(duration: Duration, power: u8) -> Self {
        Self {
            kind: CommandKind::Reverse,
            duration,
            power,
        }
    }

    pub fn rotate_in_place(
        radius_cm: f64,
        direction: TurnDirection,
        duration: Duration,
        power: u8,
    ) -> Self {
        Self {
            kind: CommandKind::RotateInPlace {
                radius_cm,
                direction,
            },
            duration,
            power,
        }
    }

    /// Halt both wheels. The short timeout matches the mower's own
    /// dead-man window for a zero-power direct command.
    pub fn stop() -> Self {
        Self {
            kind: CommandKind::Stop,
            duration: Duration::from_millis(300),
            power: 0,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CommandKind::Forward => {
                write!(f, "forward {:.2}s @ {}%", self.duration.as_secs_f64(), self.power)
            }
            CommandKind::Reverse => {
                write!(f, "reverse {:.2}s @ {}%", self.duration.as_secs_f64(), self.power)
            }
            CommandKind::RotateInPlace {
                radius_cm,
                direction,
            } => write!(
                f,
                "rotate {} r={:.0}cm {:.2}s @ {}%",
                direction,
                radius_cm,
                self.duration.as_secs_f64(),
                self.power
            ),
            CommandKind::Stop => write!(f, "stop"),
        }
    }
}

/// A command as recorded in the dispatcher's log, with issue order and time.
#[derive(Debug, Clone)]
pub struct IssuedCommand {
    pub seq: u64,
    pub issued_at: DateTime<Utc>,
    pub command: Command,
}

/// The single substitutable seam between mission logic and the drive train.
/// Exactly one implementation is bound at process start.
#[async_trait]
pub trait ActuatorPort: Send + Sync {
    fn name(&self) -> &'static str;

    /// Execute one motion command, returning once the actuator has
    /// acknowledged it and the command's duration has elapsed.
    async fn issue(&self, command: &Command) -> Result<(), ActuatorError>;
}

/// Routes every motion command through the bound backend, serializing
/// issuance so at most one command is ever in flight, and recording each
/// command in an append-only in-memory log for operator feedback.
pub struct CommandDispatcher {
    backend: Box<dyn ActuatorPort>,
    log: Mutex<Vec<IssuedCommand>>,
    in_flight: Mutex<()>,
    next_seq: AtomicU64,
}

impl CommandDispatcher {
    pub fn new(backend: Box<dyn ActuatorPort>) -> Self {
        Self {
            backend,
            log: Mutex::new(Vec::new()),
            in_flight: Mutex::new(()),
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Issue one command. The command is logged before the backend runs it,
    /// so a failed command is still visible in the log.
    pub async fn issue(&self, command: &Command) -> Result<(), ActuatorError> {
        let _guard = self.in_flight.lock().await;
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        {
            let mut log = self.log.lock().await;
            log.push(IssuedCommand {
                seq,
                issued_at: Utc::now(),
                command: command.clone(),
            });
        }
        tracing::debug!("issuing command #{}: {}", seq, command);
        self.backend.issue(command).await
    }

    /// Cleared once per mission, at start. Append-only otherwise.
    pub async fn clear_log(&self) {
        self.log.lock().await.clear();
    }

    /// Point-in-time copy of the command log.
    pub async fn log_snapshot(&self) -> Vec<IssuedCommand> {
        self.log.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AckBackend;

    #[async_trait]
    impl ActuatorPort for AckBackend {
        fn name(&self) -> &'static str {
            "ack"
        }

        async fn issue(&self, _command: &Command) -> Result<(), ActuatorError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn dispatcher_logs_commands_in_issue_order() {
        let dispatcher = CommandDispatcher::new(Box::new(AckBackend));
        dispatcher
            .issue(&Command::forward(Duration::from_millis(10), 70))
            .await
            .unwrap();
        dispatcher.issue(&Command::stop()).await.unwrap();

        let log = dispatcher.log_snapshot().await;
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].seq, 0);
        assert_eq!(log[1].seq, 1);
        assert_eq!(log[0].command.kind, CommandKind::Forward);
        assert_eq!(log[1].command.kind, CommandKind::Stop);
    }

    #[tokio::test]
    async fn clear_log_empties_the_log() {
        let dispatcher = CommandDispatcher::new(Box::new(AckBackend));
        dispatcher.issue(&Command::stop()).await.unwrap();
        dispatcher.clear_log().await;
        assert!(dispatcher.log_snapshot().await.is_empty());
    }

    #[test]
    fn command_display_is_operator_readable() {
        let cmd = Command::rotate_in_place(
            19.0,
            TurnDirection::Right,
            Duration::from_secs_f64(2.5),
            60,
        );
        assert_eq!(cmd.to_string(), "rotate right r=19cm 2.50s @ 60%");
        assert_eq!(Command::stop().to_string(), "stop");
    }
}
