// Declare the modules
pub mod api;
pub mod chat;
pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod geolocation;
pub mod intent;
pub mod models;
pub mod notifications;
pub mod random;
pub mod render;
pub mod state;
pub mod task;
pub mod trends;

use anyhow::{Context, Result};
use config::Settings;
use render::{ConsoleRenderer, Renderer};
use state::AppState;
use std::sync::Arc;

pub fn run() -> Result<()> {
    // .env first so RUST_LOG set there is honoured
    dotenvy::dotenv().ok();
    env_logger::init();

    let settings = Settings::from_env()?;
    log::info!("Starting VendorAI with {} backend", settings.backend);

    // Single-threaded, event-loop style
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    runtime.block_on(async move {
        let renderer: Arc<dyn Renderer> = Arc::new(ConsoleRenderer::new());
        let state = AppState::from_settings(&settings, renderer)?;
        state.start().await;

        let result = console::run_console(&state).await;
        state.shutdown().await;
        result
    })
}
