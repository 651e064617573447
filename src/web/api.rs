//! Defines the axum API routes and handlers.
//!
//! Handlers never touch mission internals: mission requests go over the
//! supervisor channel, camera requests go straight to the collaborators.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::{mpsc, oneshot};

use crate::camera::store::PhotoStore;
use crate::camera::FrameSource;
use crate::mission::{MissionConfig, MissionError};
use crate::web::channel::MissionRequest;
use crate::web::models::{
    CaptureResponse, ErrorResponse, IssuedCommandResponse, MissionStatusResponse,
    PhotoListResponse, StartMissionRequest, StartMissionResponse,
};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub mission_tx: mpsc::Sender<MissionRequest>,
    pub camera: Arc<dyn FrameSource>,
    pub photos: Arc<PhotoStore>,
    pub mission_defaults: MissionConfig,
    pub stream_interval: Duration,
}

/// Creates the axum router with all the API endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/mission/start", post(start_mission))
        .route("/api/v1/mission/stop", post(stop_mission))
        .route("/api/v1/mission/status", get(mission_status))
        .route("/api/v1/commands", get(command_log))
        .route("/api/v1/photos", get(list_photos))
        .route("/api/v1/camera/capture", post(capture_photo))
        .route("/api/v1/camera/stream", get(camera_stream))
        .with_state(state)
}

fn error_status(error: &MissionError) -> StatusCode {
    match error {
        MissionError::AlreadyRunning | MissionError::NotRunning => StatusCode::CONFLICT,
        MissionError::InvalidConfig(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn mission_error(error: MissionError) -> ApiError {
    (
        error_status(&error),
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

fn channel_closed() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "supervisor unavailable".to_string(),
        }),
    )
}

/// Handler to start a mission; body fields override configured defaults.
async fn start_mission(
    State(state): State<AppState>,
    payload: Option<Json<StartMissionRequest>>,
) -> Result<(StatusCode, Json<StartMissionResponse>), ApiError> {
    let overrides = payload.map(|Json(p)| p).unwrap_or_default();
    let config = overrides.apply_to(&state.mission_defaults);

    let (resp_tx, resp_rx) = oneshot::channel();
    state
        .mission_tx
        .send(MissionRequest::Start {
            config,
            respond_to: resp_tx,
        })
        .await
        .map_err(|_| channel_closed())?;

    match resp_rx.await {
        Ok(Ok(mission_id)) => Ok((
            StatusCode::ACCEPTED,
            Json(StartMissionResponse { mission_id }),
        )),
        Ok(Err(error)) => Err(mission_error(error)),
        Err(_) => Err(channel_closed()),
    }
}

/// Handler to request a cooperative stop of the running mission.
async fn stop_mission(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    let (resp_tx, resp_rx) = oneshot::channel();
    state
        .mission_tx
        .send(MissionRequest::Stop {
            respond_to: resp_tx,
        })
        .await
        .map_err(|_| channel_closed())?;

    match resp_rx.await {
        Ok(Ok(())) => Ok(StatusCode::OK),
        Ok(Err(error)) => Err(mission_error(error)),
        Err(_) => Err(channel_closed()),
    }
}

/// Handler to get the current mission status snapshot.
async fn mission_status(
    State(state): State<AppState>,
) -> Result<Json<MissionStatusResponse>, ApiError> {
    let (resp_tx, resp_rx) = oneshot::channel();
    state
        .mission_tx
        .send(MissionRequest::Status {
            respond_to: resp_tx,
        })
        .await
        .map_err(|_| channel_closed())?;

    match resp_rx.await {
        Ok(snapshot) => Ok(Json(snapshot.into())),
        Err(_) => Err(channel_closed()),
    }
}

/// Handler to read the command log for operator feedback.
async fn command_log(
    State(state): State<AppState>,
) -> Result<Json<Vec<IssuedCommandResponse>>, ApiError> {
    let (resp_tx, resp_rx) = oneshot::channel();
    state
        .mission_tx
        .send(MissionRequest::CommandLog {
            respond_to: resp_tx,
        })
        .await
        .map_err(|_| channel_closed())?;

    match resp_rx.await {
        Ok(log) => Ok(Json(log.into_iter().map(Into::into).collect())),
        Err(_) => Err(channel_closed()),
    }
}

/// Handler to list captured photos, newest first.
async fn list_photos(State(state): State<AppState>) -> Result<Json<PhotoListResponse>, ApiError> {
    match state.photos.list().await {
        Ok(photos) => Ok(Json(PhotoListResponse { photos })),
        Err(error) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: error.to_string(),
            }),
        )),
    }
}

/// Handler for a manual one-off capture.
async fn capture_photo(
    State(state): State<AppState>,
) -> Result<Json<CaptureResponse>, ApiError> {
    let frame = state.camera.acquire_frame().await.map_err(|error| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: error.to_string(),
            }),
        )
    })?;
    match state.photos.persist_labeled(&frame, "manual").await {
        Ok(filename) => Ok(Json(CaptureResponse { filename })),
        Err(error) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: error.to_string(),
            }),
        )),
    }
}

/// Handler for the live multipart stream. Each part carries one frame;
/// frames the camera cannot produce are skipped, the stream stays up.
async fn camera_stream(State(state): State<AppState>) -> impl IntoResponse {
    let camera = state.camera.clone();
    let interval = state.stream_interval;
    let stream = async_stream::stream! {
        loop {
            match camera.acquire_frame().await {
                Ok(frame) => {
                    let mut part = Vec::with_capacity(frame.bytes.len() + 128);
                    part.extend_from_slice(b"--frame\r\n");
                    part.extend_from_slice(
                        format!(
                            "Content-Type: {}\r\nContent-Length: {}\r\n\r\n",
                            frame.content_type,
                            frame.bytes.len()
                        )
                        .as_bytes(),
                    );
                    part.extend_from_slice(&frame.bytes);
                    part.extend_from_slice(b"\r\n");
                    yield Ok::<_, Infallible>(Bytes::from(part));
                }
                Err(error) => {
                    tracing::warn!("stream frame unavailable: {}", error);
                }
            }
            tokio::time::sleep(interval).await;
        }
    };
    (
        [(
            header::CONTENT_TYPE,
            "multipart/x-mixed-replace; boundary=frame",
        )],
        Body::from_stream(stream),
    )
}
