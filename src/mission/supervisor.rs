//! Mission supervisor: process-wide gate that admits one mission at a time.
//!
//! `start` validates the config, clears the command log and spawns the
//! engine task; `stop` raises the cooperative cancellation flag; `status`
//! returns a point-in-time snapshot. The slot is considered free again as
//! soon as the engine reaches a terminal phase.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::engine::MissionEngine;
use super::{MissionConfig, MissionError, MissionState};
use crate::actuator::{CommandDispatcher, IssuedCommand};
use crate::camera::store::PhotoStore;
use crate::camera::FrameSource;

struct ActiveMission {
    state: Arc<RwLock<MissionState>>,
    cancel: Arc<AtomicBool>,
}

pub struct MissionSupervisor {
    dispatcher: Arc<CommandDispatcher>,
    camera: Arc<dyn FrameSource>,
    photos: Arc<PhotoStore>,
    active: Mutex<Option<ActiveMission>>,
}

impl MissionSupervisor {
    pub fn new(
        dispatcher: Arc<CommandDispatcher>,
        camera: Arc<dyn FrameSource>,
        photos: Arc<PhotoStore>,
    ) -> Self {
        Self {
            dispatcher,
            camera,
            photos,
            active: Mutex::new(None),
        }
    }

    /// Start a mission, granting the engine exclusive ownership of the run.
    /// Fails if a mission is still in a non-terminal phase.
    pub async fn start(&self, config: MissionConfig) -> Result<Uuid, MissionError> {
        config.validate()?;

        let mut active = self.active.lock().await;
        if let Some(mission) = active.as_ref() {
            if !mission.state.read().await.phase.is_terminal() {
                return Err(MissionError::AlreadyRunning);
            }
        }

        self.dispatcher.clear_log().await;

        let mission_id = Uuid::new_v4();
        let state = Arc::new(RwLock::new(MissionState::new(mission_id, &config)));
        let cancel = Arc::new(AtomicBool::new(false));

        let engine = MissionEngine::new(
            config,
            self.dispatcher.clone(),
            self.camera.clone(),
            self.photos.clone(),
            state.clone(),
            cancel.clone(),
        );
        tokio::spawn(engine.run());

        *active = Some(ActiveMission { state, cancel });
        tracing::info!("mission {} accepted", mission_id);
        Ok(mission_id)
    }

    /// Request a cooperative stop. The running engine honors it at the next
    /// phase boundary; the in-flight command completes first.
    pub async fn stop(&self) -> Result<(), MissionError> {
        let active = self.active.lock().await;
        match active.as_ref() {
            Some(mission) if !mission.state.read().await.phase.is_terminal() => {
                mission.cancel.store(true, Ordering::SeqCst);
                tracing::info!("mission stop requested");
                Ok(())
            }
            _ => Err(MissionError::NotRunning),
        }
    }

    /// Point-in-time snapshot of the current (or last) mission.
    pub async fn status(&self) -> MissionState {
        match self.active.lock().await.as_ref() {
            Some(mission) => mission.state.read().await.clone(),
            None => MissionState::idle(),
        }
    }

    /// The command log accumulated by the current (or last) run.
    pub async fn command_log(&self) -> Vec<IssuedCommand> {
        self.dispatcher.log_snapshot().await
    }
}
