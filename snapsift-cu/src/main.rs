//! snapsift-cu - Curator Microservice
//!
//! **Module Identity:**
//! - Name: snapsift-cu (Curator)
//! - Port: 5731 (default)
//!
//! **[CUR-OV-010]** Scores album media with an external vision model,
//! tracks curation jobs in memory, and serves progress over HTTP REST + SSE.

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use snapsift_cu::services::{JOB_RETENTION, SWEEP_PERIOD};
use snapsift_cu::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting snapsift-cu (Curator) microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Load TOML config (missing file means defaults)
    let toml_config = match snapsift_common::config::config_file_path("snapsift-cu") {
        Some(path) => snapsift_common::config::load_toml_config(&path)?,
        None => snapsift_common::config::TomlConfig::default(),
    };

    let api_key = snapsift_cu::config::resolve_gemini_api_key(&toml_config)?;
    let port = snapsift_cu::config::resolve_port(&toml_config);

    // Create application state
    let state = AppState::new(api_key)?;

    // **[CUR-ST-030]** Hourly retention sweep: jobs older than the window
    // are purged regardless of status
    let store = state.store.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(SWEEP_PERIOD).await;
            let removed = store.sweep(JOB_RETENTION);
            if removed > 0 {
                info!(removed = removed, "Swept expired jobs");
            }
        }
    });

    // Build router and serve
    let app = snapsift_cu::build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("Listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
