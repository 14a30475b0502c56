use axum::{extract::DefaultBodyLimit, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;

// Application state, built once in `main` and shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: config::Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()?;
        Ok(Self { config, http })
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    // leave headroom over the file limit so the handler reports 413 itself
    let body_limit = state.config.max_file_size.saturating_add(64 * 1024);

    Router::new()
        .merge(routes::routes())
        .merge(routes::datasets::routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
