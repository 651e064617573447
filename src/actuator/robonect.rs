//! Live actuator backend for a Robonect-style mower control endpoint.
//!
//! Commands are serialized into the mower's `cmd=direct` query (left/right
//! wheel powers plus a dead-man timeout); any transport failure, HTTP error
//! status or timeout surfaces as `BackendUnavailable`, which the mission
//! engine treats as fatal. No retries here: a stalled or disconnected mower
//! must surface immediately.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{ActuatorError, ActuatorPort, Command, CommandKind, TurnDirection};
use crate::config::RobonectConfig;

pub struct RobonectActuator {
    client: Client,
    base_url: String,
    user: String,
    password: String,
    wheel_base_cm: f64,
}

impl RobonectActuator {
    pub fn new(config: &RobonectConfig) -> Result<Self, ActuatorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs_f64(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                ActuatorError::BackendUnavailable(format!("failed to create HTTP client: {e}"))
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
            wheel_base_cm: config.wheel_base_cm,
        })
    }

    /// Translate a command into left/right wheel powers in percent.
    ///
    /// Arc turns run the outer wheel at the commanded power and scale the
    /// inner wheel by the ratio of the inner to outer arc lengths over a
    /// 180 degree sweep, so the pivot honors the configured turn radius.
    fn wheel_powers(&self, command: &Command) -> (i32, i32) {
        let power = i32::from(command.power);
        match &command.kind {
            CommandKind::Forward => (power, power),
            CommandKind::Reverse => (-power, -power),
            CommandKind::Stop => (0, 0),
            CommandKind::RotateInPlace {
                radius_cm,
                direction,
            } => {
                let angle = std::f64::consts::PI;
                let arc_outer = angle * (radius_cm + self.wheel_base_cm / 2.0);
                let arc_inner = (angle * (radius_cm - self.wheel_base_cm / 2.0)).max(1e-6);
                let inner = ((f64::from(power)) * (arc_inner / arc_outer))
                    .round()
                    .max(0.0) as i32;
                match direction {
                    TurnDirection::Right => (power, inner),
                    TurnDirection::Left => (inner, power),
                }
            }
        }
    }
}

#[async_trait]
impl ActuatorPort for RobonectActuator {
    fn name(&self) -> &'static str {
        "robonect"
    }

    async fn issue(&self, command: &Command) -> Result<(), ActuatorError> {
        let (left, right) = self.wheel_powers(command);
        let timeout_ms = command.duration.as_millis();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("user", self.user.clone()),
                ("pass", self.password.clone()),
                ("cmd", "direct".to_string()),
                ("left", left.to_string()),
                ("right", right.to_string()),
                ("timeout", timeout_ms.to_string()),
            ])
            .send()
            .await
            .map_err(|e| ActuatorError::BackendUnavailable(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ActuatorError::BackendUnavailable(format!(
                "mower returned HTTP {}",
                response.status()
            )));
        }

        tracing::debug!("robonect ack: {} (L={} R={})", command, left, right);
        // The mower executes the direct command for timeout_ms; wait it out
        // so pacing matches the mock backend exactly.
        tokio::time::sleep(command.duration).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actuator() -> RobonectActuator {
        RobonectActuator::new(&RobonectConfig::default()).unwrap()
    }

    #[test]
    fn forward_drives_both_wheels_equally() {
        let powers = actuator().wheel_powers(&Command::forward(Duration::from_secs(1), 70));
        assert_eq!(powers, (70, 70));
    }

    #[test]
    fn reverse_negates_both_wheels() {
        let powers = actuator().wheel_powers(&Command::reverse(Duration::from_secs(1), 70));
        assert_eq!(powers, (-70, -70));
    }

    #[test]
    fn stop_zeroes_both_wheels() {
        assert_eq!(actuator().wheel_powers(&Command::stop()), (0, 0));
    }

    #[test]
    fn right_turn_scales_inner_wheel_by_arc_ratio() {
        // radius 19cm, wheel base 35cm: inner arc pi*1.5, outer arc pi*36.5
        let cmd = Command::rotate_in_place(
            19.0,
            TurnDirection::Right,
            Duration::from_secs_f64(2.5),
            60,
        );
        assert_eq!(actuator().wheel_powers(&cmd), (60, 2));
    }

    #[test]
    fn left_turn_mirrors_wheel_powers() {
        let cmd = Command::rotate_in_place(
            19.0,
            TurnDirection::Left,
            Duration::from_secs_f64(2.5),
            60,
        );
        assert_eq!(actuator().wheel_powers(&cmd), (2, 60));
    }

    #[test]
    fn tight_radius_clamps_inner_wheel_to_zero() {
        // Radius inside the half wheel base would give a negative inner arc.
        let cmd =
            Command::rotate_in_place(0.0, TurnDirection::Right, Duration::from_secs(2), 60);
        assert_eq!(actuator().wheel_powers(&cmd), (60, 0));
    }
}
