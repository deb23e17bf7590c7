pub mod analytics;
pub mod api;
pub mod db;
pub mod error;
pub mod grouping;
pub mod ledger;
pub mod sensing;
pub mod settings;
pub mod timer;
pub mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use api::AppState;
use db::Database;
use settings::Settings;
use timer::TimerController;
use utils::{logging::init_logging, SystemClock};

pub use error::{StudyError, StudyResult};

/// Opens the store, picks up a session left running by a previous process,
/// and builds the controller the HTTP layer drives.
pub async fn bootstrap(settings: &Settings) -> Result<TimerController> {
    std::fs::create_dir_all(&settings.data_dir).with_context(|| {
        format!(
            "failed to create data directory {}",
            settings.data_dir.display()
        )
    })?;

    let database = Database::new(settings.db_path())?;
    let timer = TimerController::new(
        database,
        Arc::new(SystemClock),
        settings.build_probe(),
        settings.sample_interval(),
    );

    match timer.recover().await {
        Ok(Some(status)) => info!("recovered open session ({})", status.as_str()),
        Ok(None) => {}
        Err(err) => warn!("failed to recover open session: {err}"),
    }

    Ok(timer)
}

pub async fn serve(settings: Settings) -> Result<()> {
    let timer = bootstrap(&settings).await?;
    let app = api::router(AppState::new(timer.clone()));

    let addr = settings.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("StudyTrack listening on http://{addr}");
    info!("DB: {}", settings.db_path().display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    timer.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown requested");
}

pub fn run() -> Result<()> {
    let settings = Settings::load()?;
    init_logging(settings.debug);

    info!("StudyTrack starting up...");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    runtime.block_on(serve(settings))
}
