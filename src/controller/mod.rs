use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Context;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use crate::config::Config;
use crate::helpers::handler_404::page_not_found_handler;
use crate::services::michelin_service::MichelinService;

pub mod discovery_controller;
pub mod health_check;
pub mod restaurant_controller;

#[derive(Clone)]
pub struct AppState {
    pub michelin_service: Arc<MichelinService>,
    pub environment: Arc<String>,
}

pub async fn serve(
    app_state: AppState,
    config: &Config,
) -> anyhow::Result<()> {
    let application = application(app_state, &config.origin_urls);

    let address = SocketAddr::new(config.bind_address, config.port);
    info!("API server listening on: {}", address);
    axum::Server::bind(&address)
        .serve(application.into_make_service())
        .await
        .context("Error spinning up the API server")
}

pub fn application(
    app_state: AppState,
    origin_urls: &str,
) -> Router {
    router_endpoints(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(origin_urls))
                .layer(CompressionLayer::new())
        )
        .fallback(page_not_found_handler)
}

pub fn router_endpoints(app_state: AppState) -> Router {
    Router::new()
        .merge(health_check::router(app_state.clone()))
        .nest("/api/v1/restaurants", restaurant_controller::router(app_state.clone()))
        .nest("/api/v1/discover", discovery_controller::router(app_state))
}

fn cors_layer(origin_urls: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    if origin_urls.trim() == "*" {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origin_urls
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {}: {}", origin, e);
                None
            }
        })
        .collect();

    cors.allow_origin(origins)
}
