//! Contains the data models for API requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actuator::IssuedCommand;
use crate::mission::{CaptureMode, MissionConfig, MissionState};

/// Optional overrides for a mission start; unset fields fall back to the
/// configured defaults.
#[derive(Debug, Default, Deserialize)]
pub struct StartMissionRequest {
    #[serde(default)]
    pub row_dwell_secs: Option<f64>,
    #[serde(default)]
    pub row_count: Option<u32>,
    #[serde(default)]
    pub drive_power: Option<u8>,
    #[serde(default)]
    pub turn_radius_cm: Option<f64>,
    #[serde(default)]
    pub turn_power: Option<u8>,
    #[serde(default)]
    pub turn_secs: Option<f64>,
    #[serde(default)]
    pub inter_segment_pause_secs: Option<f64>,
    #[serde(default)]
    pub capture_mode: Option<CaptureMode>,
}

impl StartMissionRequest {
    pub fn apply_to(&self, defaults: &MissionConfig) -> MissionConfig {
        MissionConfig {
            row_dwell_secs: self.row_dwell_secs.unwrap_or(defaults.row_dwell_secs),
            row_count: self.row_count.unwrap_or(defaults.row_count),
            drive_power: self.drive_power.unwrap_or(defaults.drive_power),
            turn_radius_cm: self.turn_radius_cm.unwrap_or(defaults.turn_radius_cm),
            turn_power: self.turn_power.unwrap_or(defaults.turn_power),
            turn_secs: self.turn_secs.unwrap_or(defaults.turn_secs),
            inter_segment_pause_secs: self
                .inter_segment_pause_secs
                .unwrap_or(defaults.inter_segment_pause_secs),
            capture_mode: self.capture_mode.unwrap_or(defaults.capture_mode),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StartMissionResponse {
    pub mission_id: Uuid,
}

/// Snapshot of the current (or last) mission.
#[derive(Debug, Serialize)]
pub struct MissionStatusResponse {
    pub mission_id: Option<Uuid>,
    pub phase: String,
    pub current_row: u32,
    pub row_count: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub last_command: Option<String>,
    pub captured_files: Vec<String>,
    pub abort_reason: Option<String>,
}

impl From<MissionState> for MissionStatusResponse {
    fn from(state: MissionState) -> Self {
        Self {
            mission_id: state.mission_id,
            phase: state.phase.to_string(),
            current_row: state.current_row,
            row_count: state.row_count,
            started_at: state.started_at,
            last_command: state.last_command,
            captured_files: state.captured_files,
            abort_reason: state.abort_reason,
        }
    }
}

/// One entry of the command log, flattened for operator display.
#[derive(Debug, Serialize)]
pub struct IssuedCommandResponse {
    pub seq: u64,
    pub issued_at: DateTime<Utc>,
    pub command: String,
    pub duration_secs: f64,
    pub power: u8,
}

impl From<IssuedCommand> for IssuedCommandResponse {
    fn from(issued: IssuedCommand) -> Self {
        Self {
            seq: issued.seq,
            issued_at: issued.issued_at,
            command: issued.command.to_string(),
            duration_secs: issued.command.duration.as_secs_f64(),
            power: issued.command.power,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PhotoListResponse {
    pub photos: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CaptureResponse {
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
