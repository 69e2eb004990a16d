use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use content_automator::api::{build_router, AppState};
use content_automator::config::load_or_default;
use content_automator::{
    telemetry, ContentWorker, Database, JobStore, TemplateGenerator, WorkerSettings,
};
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("content-automator: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> content_automator::Result<()> {
    let config = load_or_default(std::env::args_os().nth(1).map(PathBuf::from))?;
    telemetry::init(&config.log);

    info!("Starting content-automator v{}", env!("CARGO_PKG_VERSION"));

    let db = Database::open(&config.database_path())?;
    let store = JobStore::new(db);
    let generator = Arc::new(TemplateGenerator::discover(&config.model_directories));
    let worker = Arc::new(ContentWorker::new(
        store,
        generator,
        WorkerSettings::from(&config.worker),
    ));

    if config.worker.autostart {
        worker.start()?;
    }

    let app = build_router(Arc::new(AppState::new(Arc::clone(&worker))));
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Dashboard: http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    worker.stop();
    let joined = Arc::clone(&worker);
    if let Err(e) = tokio::task::spawn_blocking(move || joined.wait()).await {
        tracing::warn!("Worker shutdown did not complete: {}", e);
    }

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
