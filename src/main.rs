// src/main.rs - Rover host entrypoint: wiring and the web server
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;

use rover_host::actuator::mock::MockActuator;
use rover_host::actuator::robonect::RobonectActuator;
use rover_host::actuator::{ActuatorPort, CommandDispatcher};
use rover_host::camera::placeholder::PlaceholderCamera;
use rover_host::camera::store::PhotoStore;
use rover_host::camera::FrameSource;
use rover_host::config::{self, ActuatorBackendKind};
use rover_host::mission::supervisor::MissionSupervisor;
use rover_host::web::api::{self, AppStateInner};
use rover_host::web::channel::{self, MissionRequest};

#[derive(Parser)]
#[command(name = "rover-host", about = "Field-scouting rover mission host")]
struct Cli {
    /// Path to the rover configuration file
    #[arg(short, long, default_value = "rover.toml")]
    config: String,

    /// Override the web bind address from the config
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting rover-host");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();

    let config = config::load_config(&cli.config).map_err(|e| {
        tracing::error!("Failed to load config from '{}': {}", cli.config, e);
        Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>
    })?;

    tracing::info!("Rover: {} ({:?} backend)", config.rover.name, config.rover.backend);
    tracing::info!(
        "Mission defaults: {} rows, {:.1}s per row",
        config.mission.row_count,
        config.mission.row_dwell_secs
    );

    let backend: Box<dyn ActuatorPort> = match config.rover.backend {
        ActuatorBackendKind::Mock => Box::new(MockActuator::new()),
        ActuatorBackendKind::Robonect => {
            tracing::info!("Mower endpoint: {}", config.robonect.base_url);
            Box::new(RobonectActuator::new(&config.robonect)?)
        }
    };
    let dispatcher = Arc::new(CommandDispatcher::new(backend));

    let camera: Arc<dyn FrameSource> = Arc::new(PlaceholderCamera::new(&config.camera));
    let photos = Arc::new(PhotoStore::new(&config.camera.photo_dir));
    tokio::fs::create_dir_all(photos.dir()).await?;

    let supervisor = MissionSupervisor::new(dispatcher, camera.clone(), photos.clone());

    // Channel between the axum handlers and the supervisor task.
    let (mission_tx, mission_rx) = mpsc::channel::<MissionRequest>(16);
    tokio::spawn(channel::serve_supervisor(supervisor, mission_rx));

    let stream_interval = Duration::from_secs_f64(1.0 / config.camera.stream_fps.max(0.1));
    let app = api::create_router(Arc::new(AppStateInner {
        mission_tx,
        camera,
        photos,
        mission_defaults: config.mission.clone(),
        stream_interval,
    }));

    let bind = cli.bind.unwrap_or(config.web.bind);
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("Web API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
