//! Integration tests for the mission supervisor: single-mission invariant,
//! cooperative stop, and command log lifecycle.

use std::sync::Arc;
use std::time::Duration;

use tokio_test::assert_ok;

use rover_host::actuator::mock::MockActuator;
use rover_host::actuator::CommandDispatcher;
use rover_host::camera::placeholder::PlaceholderCamera;
use rover_host::camera::store::PhotoStore;
use rover_host::config::CameraConfig;
use rover_host::mission::supervisor::MissionSupervisor;
use rover_host::mission::{CaptureMode, MissionConfig, MissionError, MissionPhase};

struct Harness {
    supervisor: MissionSupervisor,
    _photo_dir: tempfile::TempDir,
}

fn harness() -> Harness {
    let dispatcher = Arc::new(CommandDispatcher::new(Box::new(MockActuator::new())));
    let photo_dir = tempfile::tempdir().unwrap();
    let photos = Arc::new(PhotoStore::new(photo_dir.path()));
    let camera = Arc::new(PlaceholderCamera::new(&CameraConfig {
        frame_width: 32,
        frame_height: 24,
        ..CameraConfig::default()
    }));
    Harness {
        supervisor: MissionSupervisor::new(dispatcher, camera, photos),
        _photo_dir: photo_dir,
    }
}

fn slow_mission() -> MissionConfig {
    MissionConfig {
        row_count: 3,
        row_dwell_secs: 60.0,
        ..MissionConfig::default()
    }
}

fn quick_mission() -> MissionConfig {
    MissionConfig {
        row_count: 1,
        row_dwell_secs: 0.1,
        inter_segment_pause_secs: 0.0,
        capture_mode: CaptureMode::StartEndOnly,
        ..MissionConfig::default()
    }
}

/// Drive virtual time until the mission reaches a terminal phase.
async fn await_terminal(supervisor: &MissionSupervisor) -> MissionPhase {
    for _ in 0..200 {
        let snapshot = supervisor.status().await;
        if snapshot.phase.is_terminal() {
            return snapshot.phase;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    panic!("mission never reached a terminal phase");
}

#[tokio::test(start_paused = true)]
async fn second_start_is_rejected_while_running() {
    let h = harness();
    let first = assert_ok!(h.supervisor.start(slow_mission()).await);

    let second = h.supervisor.start(slow_mission()).await;
    assert!(matches!(second, Err(MissionError::AlreadyRunning)));

    // The running mission is untouched by the rejected start.
    let status = h.supervisor.status().await;
    assert_eq!(status.mission_id, Some(first));
    assert!(!status.phase.is_terminal());
}

#[tokio::test(start_paused = true)]
async fn stop_without_mission_fails() {
    let h = harness();
    assert!(matches!(
        h.supervisor.stop().await,
        Err(MissionError::NotRunning)
    ));
}

#[tokio::test(start_paused = true)]
async fn invalid_config_is_rejected_and_nothing_starts() {
    let h = harness();
    let result = h
        .supervisor
        .start(MissionConfig {
            row_count: 0,
            ..MissionConfig::default()
        })
        .await;
    assert!(matches!(result, Err(MissionError::InvalidConfig(_))));
    assert_eq!(h.supervisor.status().await.phase, MissionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn stop_aborts_at_the_next_phase_boundary() {
    let h = harness();
    assert_ok!(h.supervisor.start(slow_mission()).await);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_ok!(h.supervisor.stop().await);

    assert_eq!(await_terminal(&h.supervisor).await, MissionPhase::Aborted);
    let status = h.supervisor.status().await;
    assert_eq!(status.abort_reason.as_deref(), Some("stop requested"));
}

#[tokio::test(start_paused = true)]
async fn slot_frees_after_completion() {
    let h = harness();
    let first = assert_ok!(h.supervisor.start(quick_mission()).await);
    assert_eq!(await_terminal(&h.supervisor).await, MissionPhase::Completed);

    let second = assert_ok!(h.supervisor.start(quick_mission()).await);
    assert_ne!(first, second);
    assert_eq!(await_terminal(&h.supervisor).await, MissionPhase::Completed);
}

#[tokio::test(start_paused = true)]
async fn command_log_is_cleared_on_each_start() {
    let h = harness();
    assert_ok!(h.supervisor.start(quick_mission()).await);
    await_terminal(&h.supervisor).await;
    let first_run = h.supervisor.command_log().await;
    assert!(!first_run.is_empty());

    assert_ok!(h.supervisor.start(quick_mission()).await);
    await_terminal(&h.supervisor).await;
    // Only the second run's commands remain: one drive plus the final stop.
    let second_run = h.supervisor.command_log().await;
    assert_eq!(second_run.len(), 2);
}
