//! Mission execution engine: the state machine that walks the snake path.
//!
//! One engine runs per mission, on its own task. It owns the mission state
//! exclusively and publishes snapshots through the shared lock; motion goes
//! through the command dispatcher, photographs through the capture rules
//! and the camera collaborators.
//!
//! Failure policy: a `BackendUnavailable` from any motion command aborts
//! the mission after one best-effort stop command. Motion commands are
//! never retried, so a stalled or disconnected drive train surfaces
//! immediately instead of being masked. Camera failures only skip the
//! affected photo. External stop requests are honored between phases; an
//! in-flight command always runs to completion.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use super::capture::{PathEvent, should_capture};
use super::{MissionConfig, MissionPhase, MissionState};
use crate::actuator::{ActuatorError, Command, CommandDispatcher, TurnDirection};
use crate::camera::store::PhotoStore;
use crate::camera::FrameSource;

pub struct MissionEngine {
    config: MissionConfig,
    dispatcher: Arc<CommandDispatcher>,
    camera: Arc<dyn FrameSource>,
    photos: Arc<PhotoStore>,
    state: Arc<RwLock<MissionState>>,
    cancel: Arc<AtomicBool>,
}

impl MissionEngine {
    pub fn new(
        config: MissionConfig,
        dispatcher: Arc<CommandDispatcher>,
        camera: Arc<dyn FrameSource>,
        photos: Arc<PhotoStore>,
        state: Arc<RwLock<MissionState>>,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            dispatcher,
            camera,
            photos,
            state,
            cancel,
        }
    }

    /// Run the mission to a terminal state. Consumes the engine; the
    /// outcome is readable through the shared state.
    pub async fn run(self) {
        tracing::info!(
            "mission started: {} rows, {:.1}s per row, capture mode {:?}",
            self.config.row_count,
            self.config.row_dwell_secs,
            self.config.capture_mode
        );

        self.capture_if_due(PathEvent::MissionStart).await;

        let mut direction = TurnDirection::Right;
        let mut row: u32 = 1;
        loop {
            self.set_phase(MissionPhase::DrivingRow).await;
            let drive = if row % 2 == 1 {
                Command::forward(self.config.row_dwell(), self.config.drive_power)
            } else {
                Command::reverse(self.config.row_dwell(), self.config.drive_power)
            };
            tracing::info!("row {}/{}: {}", row, self.config.row_count, drive);
            if let Err(e) = self.issue(&drive).await {
                self.fail(&format!("row {row} drive failed"), e).await;
                return;
            }
            self.settle().await;

            self.capture_if_due(PathEvent::RowCompleted { row }).await;

            if row == self.config.row_count {
                if let Err(e) = self.issue(&Command::stop()).await {
                    self.fail("final stop failed", e).await;
                    return;
                }
                self.capture_if_due(PathEvent::MissionComplete { row }).await;
                self.set_phase(MissionPhase::Completed).await;
                tracing::info!("mission complete: {} rows traversed", row);
                return;
            }

            if self.cancel_requested() {
                self.cancel_mission().await;
                return;
            }

            self.set_phase(MissionPhase::Turning).await;
            let turn = Command::rotate_in_place(
                self.config.turn_radius_cm,
                direction,
                self.config.turn_duration(),
                self.config.turn_power,
            );
            tracing::info!("end of row {}: {}", row, turn);
            if let Err(e) = self.issue(&turn).await {
                self.fail(&format!("turn after row {row} failed"), e).await;
                return;
            }
            self.settle().await;

            direction = direction.flipped();
            row += 1;
            self.state.write().await.current_row = row;

            if self.cancel_requested() {
                self.cancel_mission().await;
                return;
            }
        }
    }

    fn cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    async fn set_phase(&self, phase: MissionPhase) {
        self.state.write().await.phase = phase;
    }

    async fn issue(&self, command: &Command) -> Result<(), ActuatorError> {
        self.state.write().await.last_command = Some(command.to_string());
        self.dispatcher.issue(command).await
    }

    async fn settle(&self) {
        let pause = self.config.inter_segment_pause();
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }

    /// Take a photo if the capture rules schedule one for this event.
    /// Camera trouble is logged and skipped, never fatal.
    async fn capture_if_due(&self, event: PathEvent) {
        let Some(capture) = should_capture(event, self.config.capture_mode) else {
            return;
        };
        self.set_phase(MissionPhase::Capturing).await;
        match self.camera.acquire_frame().await {
            Ok(frame) => match self.photos.persist_capture(&frame, &capture).await {
                Ok(name) => {
                    self.state.write().await.captured_files.push(name);
                }
                Err(e) => {
                    tracing::warn!("capture {}_{} not persisted: {}", capture.tag, capture.row, e);
                }
            },
            Err(e) => {
                tracing::warn!("capture {}_{} skipped: {}", capture.tag, capture.row, e);
            }
        }
    }

    /// Actuator failure: one best-effort stop, then terminal abort.
    async fn fail(&self, context: &str, err: ActuatorError) {
        tracing::error!("{}: {}; aborting mission", context, err);
        self.try_stop().await;
        let mut state = self.state.write().await;
        state.phase = MissionPhase::Aborted;
        state.abort_reason = Some(format!("{context}: {err}"));
    }

    /// Cooperative stop honored at a phase boundary.
    async fn cancel_mission(&self) {
        tracing::info!("stop requested, aborting at phase boundary");
        self.try_stop().await;
        let mut state = self.state.write().await;
        state.phase = MissionPhase::Aborted;
        state.abort_reason = Some("stop requested".to_string());
    }

    async fn try_stop(&self) {
        if let Err(e) = self.issue(&Command::stop()).await {
            tracing::warn!("stop attempt failed: {}", e);
        }
    }
}
