use std::{future::Future, path::Path};

use axum::Router;
use tokio::net::TcpListener;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::routes::{self, AppState};
use service::file::checkin_store::FileDocumentRepository;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Prepare storage and assemble the router. Fails if the document cannot be initialized.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    common::env::ensure_env(&cfg.storage.frontend_dir, &cfg.storage.data_file).await?;

    let repo = FileDocumentRepository::new(&cfg.storage.data_file).await?;
    info!(path = %repo.path().display(), "document store ready");

    let state = AppState::new(repo);
    Ok(routes::build_router(state, build_cors(), Path::new(&cfg.storage.frontend_dir)))
}

/// Public entry: build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    let addr = cfg.server.bind_addr()?;
    info!(%addr, "Backend server running at http://{addr}");
    let listener = TcpListener::bind(addr).await?;
    serve_until(listener, app, shutdown_signal()).await
}

/// Serve until `shutdown` resolves, then let in-flight requests finish.
pub async fn serve_until<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}

/// Resolves on Ctrl+C; in-flight requests (and their document writes) finish first.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, draining in-flight requests");
}
