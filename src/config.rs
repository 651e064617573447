// src/config.rs - Rover host configuration
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mission::MissionConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Main configuration struct for the rover host, actuator backend, camera
/// and web surface. Every field has a default so the host can start with no
/// config file at all (mock backend, placeholder camera).
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub rover: RoverConfig,
    #[serde(default)]
    pub robonect: RobonectConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub mission: MissionConfig,
}

/// Which actuator backend drives the wheels. Chosen once at startup and
/// never swapped for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActuatorBackendKind {
    Mock,
    Robonect,
}

/// Rover-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoverConfig {
    #[serde(default = "default_rover_name")]
    pub name: String,
    /// Defaults to the mock backend so a laptop run can never move hardware.
    #[serde(default = "default_backend")]
    pub backend: ActuatorBackendKind,
}

impl Default for RoverConfig {
    fn default() -> Self {
        Self {
            name: default_rover_name(),
            backend: default_backend(),
        }
    }
}

/// Connection settings for the mower's Robonect-style control endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RobonectConfig {
    #[serde(default = "default_robonect_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: f64,
    /// Track width between the wheel centers, used for arc-turn power math.
    #[serde(default = "default_wheel_base_cm")]
    pub wheel_base_cm: f64,
}

impl Default for RobonectConfig {
    fn default() -> Self {
        Self {
            base_url: default_robonect_base_url(),
            user: String::new(),
            password: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
            wheel_base_cm: default_wheel_base_cm(),
        }
    }
}

/// Camera and photo storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraConfig {
    #[serde(default = "default_photo_dir")]
    pub photo_dir: String,
    #[serde(default = "default_frame_width")]
    pub frame_width: u32,
    #[serde(default = "default_frame_height")]
    pub frame_height: u32,
    /// Frames per second for the live stream endpoint.
    #[serde(default = "default_stream_fps")]
    pub stream_fps: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            photo_dir: default_photo_dir(),
            frame_width: default_frame_width(),
            frame_height: default_frame_height(),
            stream_fps: default_stream_fps(),
        }
    }
}

/// Web API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_rover_name() -> String {
    "field-rover".to_string()
}

fn default_backend() -> ActuatorBackendKind {
    ActuatorBackendKind::Mock
}

fn default_robonect_base_url() -> String {
    "http://192.168.4.14/xml".to_string()
}

fn default_request_timeout_secs() -> f64 {
    5.0
}

fn default_wheel_base_cm() -> f64 {
    35.0
}

fn default_photo_dir() -> String {
    "photos".to_string()
}

fn default_frame_width() -> u32 {
    640
}

fn default_frame_height() -> u32 {
    480
}

fn default_stream_fps() -> f64 {
    10.0
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

/// Load configuration from a TOML file. A missing file is not an error:
/// the host falls back to the all-defaults config, which binds the mock
/// backend and can never move hardware.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    if !std::path::Path::new(path).exists() {
        tracing::warn!(
            "config file '{}' not found, using defaults (mock backend)",
            path
        );
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)?;
    let config = toml::from_str(&raw)?;
    Ok(config)
}
