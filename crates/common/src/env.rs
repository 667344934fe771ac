//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected paths exist at startup.

use std::path::Path;

use tracing::warn;

/// Warn when the frontend directory is missing; create the data file's parent directory.
pub async fn ensure_env(frontend_dir: &str, data_file: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(frontend_dir).await.is_err() {
        warn!(%frontend_dir, "frontend assets directory not found; static assets may 404");
    }
    if let Some(data_dir) = Path::new(data_file).parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
    }
    Ok(())
}
