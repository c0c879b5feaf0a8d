mod app;
mod config;
mod error;
mod foodlog;
mod nutrition;
mod state;

use crate::foodlog::persist;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "nutrilog=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;

    if let Some(path) = app_state.config.snapshot_path.clone() {
        persist::spawn_flusher(
            app_state.store.clone(),
            path,
            app_state.config.snapshot_flush_secs,
        );
    }

    let app = app::build_app(app_state);
    app::serve(app).await
}
