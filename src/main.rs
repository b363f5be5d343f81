use std::sync::Arc;
use std::time::Duration;
use clap::Parser;
use dotenv::dotenv;
use tracing::{info, warn};
use crate::config::Config;
use crate::controller::AppState;
use crate::repositories::dataset_repo::{DatasetRepo, DatasetSource};
use crate::services::michelin_service::MichelinService;

pub mod config;
pub mod controller;
pub mod helpers;
pub mod models;
pub mod repositories;
pub mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::parse();
    info!("Starting michelin mind backend in {} environment", config.environment);

    let source = match &config.dataset_path {
        Some(path) => DatasetSource::File(path.clone()),
        None => DatasetSource::Url(config.dataset_url.clone()),
    };
    let dataset_repo = DatasetRepo::new(
        source,
        Duration::from_secs(config.fetch_timeout_secs),
    )?;
    let michelin_service = Arc::new(MichelinService::new(
        dataset_repo,
        config.max_page_size,
    ));

    if config.preload_dataset {
        // a failed preload is retried by the first query
        if let Err(e) = michelin_service.refresh().await {
            warn!("Failed to preload restaurant dataset: {}", e);
        }
    }

    let app_state = AppState {
        michelin_service,
        environment: Arc::new(config.environment.clone()),
    };

    controller::serve(app_state, &config).await
}
