use axum::{Extension, Json, Router};
use axum::http::StatusCode;
use axum::routing::get;
use serde_json::{json, Value};
use crate::controller::AppState;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(get_health_check))
        .route_layer(Extension(app_state))
}

/// Liveness plus the state of the restaurant dataset. The dataset is reported,
/// never loaded, by this endpoint.
async fn get_health_check(
    Extension(app_state): Extension<AppState>,
) -> (StatusCode, Json<Value>) {
    let dataset = app_state.michelin_service.dataset_status().await;

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "environment": app_state.environment.as_str(),
            "dataset": dataset,
        })),
    )
}
