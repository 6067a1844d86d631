use anyhow::Context;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod db;
mod entities;
mod form;
mod handler;
mod logging;
mod openapi;
mod repo;
mod schema;
mod service;
mod state;

use crate::{
    service::config::{ConfigService, ConfigServiceImpl},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Arc::new(ConfigServiceImpl::new());
    logging::init(&config.values().log_level, config.values().log_json)?;

    let state = AppState::new(config.clone())
        .await
        .context("database setup failed")?;

    let app = handler::router(state.clone()).merge(
        SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
    );

    let bind_addr = format!("0.0.0.0:{}", state.config().port());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;
    tracing::info!(%bind_addr, "garage-accounting: listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
