// src/mission/mod.rs - Mission data model shared by engine, supervisor and web
pub mod capture;
pub mod engine;
pub mod supervisor;

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MissionError {
    #[error("a mission is already running")]
    AlreadyRunning,
    #[error("no mission is running")]
    NotRunning,
    #[error("invalid mission config: {0}")]
    InvalidConfig(String),
}

/// When photographs are taken along the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// One photo at mission start, one at mission end.
    StartEndOnly,
    /// One photo at mission start, then one at the end of every row.
    EveryRowEnd,
}

/// Immutable input to one mission run. Row length is a dwell time, not a
/// distance: the rover has no odometry, so the operator tunes seconds per
/// row. That approximation is deliberate and configured, not inferred.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MissionConfig {
    #[serde(default = "default_row_dwell_secs")]
    pub row_dwell_secs: f64,
    #[serde(default = "default_row_count")]
    pub row_count: u32,
    #[serde(default = "default_drive_power")]
    pub drive_power: u8,
    #[serde(default = "default_turn_radius_cm")]
    pub turn_radius_cm: f64,
    #[serde(default = "default_turn_power")]
    pub turn_power: u8,
    #[serde(default = "default_turn_secs")]
    pub turn_secs: f64,
    /// Settle pause between path segments.
    #[serde(default = "default_inter_segment_pause_secs")]
    pub inter_segment_pause_secs: f64,
    #[serde(default = "default_capture_mode")]
    pub capture_mode: CaptureMode,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            row_dwell_secs: default_row_dwell_secs(),
            row_count: default_row_count(),
            drive_power: default_drive_power(),
            turn_radius_cm: default_turn_radius_cm(),
            turn_power: default_turn_power(),
            turn_secs: default_turn_secs(),
            inter_segment_pause_secs: default_inter_segment_pause_secs(),
            capture_mode: default_capture_mode(),
        }
    }
}

impl MissionConfig {
    pub fn validate(&self) -> Result<(), MissionError> {
        if self.row_count < 1 {
            return Err(MissionError::InvalidConfig(
                "row_count must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("row_dwell_secs", self.row_dwell_secs),
            ("turn_radius_cm", self.turn_radius_cm),
            ("turn_secs", self.turn_secs),
            ("inter_segment_pause_secs", self.inter_segment_pause_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(MissionError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("drive_power", self.drive_power),
            ("turn_power", self.turn_power),
        ] {
            if value > 100 {
                return Err(MissionError::InvalidConfig(format!(
                    "{name} must be at most 100%, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn row_dwell(&self) -> Duration {
        Duration::from_secs_f64(self.row_dwell_secs)
    }

    pub fn turn_duration(&self) -> Duration {
        Duration::from_secs_f64(self.turn_secs)
    }

    pub fn inter_segment_pause(&self) -> Duration {
        Duration::from_secs_f64(self.inter_segment_pause_secs)
    }
}

fn default_row_dwell_secs() -> f64 {
    1.5
}

fn default_row_count() -> u32 {
    3
}

fn default_drive_power() -> u8 {
    70
}

fn default_turn_radius_cm() -> f64 {
    19.0
}

fn default_turn_power() -> u8 {
    60
}

fn default_turn_secs() -> f64 {
    2.5
}

fn default_inter_segment_pause_secs() -> f64 {
    0.5
}

fn default_capture_mode() -> CaptureMode {
    CaptureMode::EveryRowEnd
}

/// Where the mission stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionPhase {
    Idle,
    DrivingRow,
    Turning,
    Capturing,
    Completed,
    Aborted,
}

impl MissionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, MissionPhase::Completed | MissionPhase::Aborted)
    }
}

impl fmt::Display for MissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MissionPhase::Idle => "idle",
            MissionPhase::DrivingRow => "driving_row",
            MissionPhase::Turning => "turning",
            MissionPhase::Capturing => "capturing",
            MissionPhase::Completed => "completed",
            MissionPhase::Aborted => "aborted",
        };
        write!(f, "{name}")
    }
}

/// Mutable state of one mission run. Owned exclusively by the engine while
/// running; everyone else reads point-in-time clones through the supervisor.
#[derive(Debug, Clone)]
pub struct MissionState {
    pub mission_id: Option<Uuid>,
    pub phase: MissionPhase,
    /// 1-indexed row currently (or last) being traversed.
    pub current_row: u32,
    pub row_count: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub last_command: Option<String>,
    /// Capture filenames in acquisition order.
    pub captured_files: Vec<String>,
    pub abort_reason: Option<String>,
}

impl MissionState {
    /// Snapshot shown before any mission has ever started.
    pub fn idle() -> Self {
        Self {
            mission_id: None,
            phase: MissionPhase::Idle,
            current_row: 0,
            row_count: 0,
            started_at: None,
            last_command: None,
            captured_files: Vec::new(),
            abort_reason: None,
        }
    }

    /// Fresh state for a new run.
    pub fn new(mission_id: Uuid, config: &MissionConfig) -> Self {
        Self {
            mission_id: Some(mission_id),
            phase: MissionPhase::Idle,
            current_row: 1,
            row_count: config.row_count,
            started_at: Some(Utc::now()),
            last_command: None,
            captured_files: Vec::new(),
            abort_reason: None,
        }
    }
}
