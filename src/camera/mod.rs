// src/camera/mod.rs - Frame acquisition seam and photo persistence
pub mod placeholder;
pub mod store;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CameraError {
    /// The camera could not produce a frame. Never mission-fatal: captures
    /// are skipped and logged when this surfaces.
    #[error("no frame available: {0}")]
    NoFrameAvailable(String),
    #[error("photo storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// One acquired image.
#[derive(Debug, Clone)]
pub struct Frame {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

impl Frame {
    /// File extension matching the frame's encoding.
    pub fn extension(&self) -> &'static str {
        match self.content_type {
            "image/jpeg" => "jpg",
            "image/bmp" => "bmp",
            _ => "bin",
        }
    }
}

/// Source of live frames. The placeholder variant is bound when no webcam
/// is present; a webcam driver implements the same trait.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn acquire_frame(&self) -> Result<Frame, CameraError>;
}
