//! Defines the communication channel messages between the web server and
//! the mission supervisor task.

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::actuator::IssuedCommand;
use crate::mission::supervisor::MissionSupervisor;
use crate::mission::{MissionConfig, MissionError, MissionState};

/// A request sent from a web handler to the supervisor task.
#[derive(Debug)]
pub enum MissionRequest {
    /// Start a mission with the given (already merged) config.
    Start {
        config: MissionConfig,
        respond_to: oneshot::Sender<Result<Uuid, MissionError>>,
    },
    /// Request a cooperative stop of the running mission.
    Stop {
        respond_to: oneshot::Sender<Result<(), MissionError>>,
    },
    /// Snapshot of the current mission state.
    Status {
        respond_to: oneshot::Sender<MissionState>,
    },
    /// The command log of the current (or last) run.
    CommandLog {
        respond_to: oneshot::Sender<Vec<IssuedCommand>>,
    },
}

/// Service loop: owns the supervisor and drains handler requests until the
/// channel closes. Spawned once at startup.
pub async fn serve_supervisor(
    supervisor: MissionSupervisor,
    mut requests: mpsc::Receiver<MissionRequest>,
) {
    while let Some(request) = requests.recv().await {
        match request {
            MissionRequest::Start { config, respond_to } => {
                let _ = respond_to.send(supervisor.start(config).await);
            }
            MissionRequest::Stop { respond_to } => {
                let _ = respond_to.send(supervisor.stop().await);
            }
            MissionRequest::Status { respond_to } => {
                let _ = respond_to.send(supervisor.status().await);
            }
            MissionRequest::CommandLog { respond_to } => {
                let _ = respond_to.send(supervisor.command_log().await);
            }
        }
    }
}
