//! Mock actuator backend: logs each command and sleeps out its duration so
//! mission pacing looks identical to a hardware run, then always acks.

use async_trait::async_trait;

use super::{ActuatorError, ActuatorPort, Command};

pub struct MockActuator;

impl MockActuator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockActuator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActuatorPort for MockActuator {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn issue(&self, command: &Command) -> Result<(), ActuatorError> {
        tracing::info!("[mock] {}", command);
        tokio::time::sleep(command.duration).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn mock_acks_after_command_duration() {
        let mock = MockActuator::new();
        let start = tokio::time::Instant::now();
        mock.issue(&Command::forward(Duration::from_secs(2), 70))
            .await
            .unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }
}
