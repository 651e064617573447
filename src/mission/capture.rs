//! Capture scheduling: decides whether a path event warrants a photograph.
//!
//! Pure decision logic, no I/O. Frame acquisition and persistence belong to
//! the camera collaborators; a camera failure downstream never changes what
//! was scheduled here.

use std::fmt;

use super::CaptureMode;

/// A path-relative milestone reported by the mission engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEvent {
    MissionStart,
    RowCompleted { row: u32 },
    MissionComplete { row: u32 },
}

/// Why a photograph is being taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTag {
    RowStart,
    RowEnd,
    MissionEnd,
}

impl fmt::Display for CaptureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            CaptureTag::RowStart => "start",
            CaptureTag::RowEnd => "rowend",
            CaptureTag::MissionEnd => "end",
        };
        write!(f, "{tag}")
    }
}

/// A scheduled photograph with its mission context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureEvent {
    pub tag: CaptureTag,
    pub row: u32,
}

/// Decide whether `event` triggers a capture under `mode`.
///
/// Both modes photograph the mission start. `EveryRowEnd` photographs the
/// end of every row including the last, so mission completion adds nothing
/// extra; `StartEndOnly` photographs only at completion.
pub fn should_capture(event: PathEvent, mode: CaptureMode) -> Option<CaptureEvent> {
    match (event, mode) {
        (PathEvent::MissionStart, _) => Some(CaptureEvent {
            tag: CaptureTag::RowStart,
            row: 1,
        }),
        (PathEvent::RowCompleted { row }, CaptureMode::EveryRowEnd) => Some(CaptureEvent {
            tag: CaptureTag::RowEnd,
            row,
        }),
        (PathEvent::RowCompleted { .. }, CaptureMode::StartEndOnly) => None,
        (PathEvent::MissionComplete { row }, CaptureMode::StartEndOnly) => Some(CaptureEvent {
            tag: CaptureTag::MissionEnd,
            row,
        }),
        (PathEvent::MissionComplete { .. }, CaptureMode::EveryRowEnd) => None,
    }
}
