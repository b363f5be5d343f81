use std::sync::Arc;
use axum::{Extension, Json, Router};
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::controller::AppState;
use crate::helpers::service_response::{error_response, into_json_response};
use crate::models::search::SearchCriteria;
use crate::services::michelin_service::MichelinService;

pub const DEFAULT_RECOMMENDATIONS: usize = 5;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(search_restaurants))
        .route("/by-name", get(retrieve_restaurant_by_name))
        .route("/refresh", post(refresh_dataset))
        .route("/:id", get(retrieve_restaurant))
        .route("/:id/recommendations", get(recommend_restaurants))
        .route_layer(Extension(app_state.michelin_service))
}

pub async fn search_restaurants(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
    Query(criteria): Query<SearchCriteria>,
) -> impl IntoResponse {
    let search_res = michelin_service
        .search(&criteria)
        .await;

    return match search_res {
        Ok(result) => {
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(e) => {
            warn!("Something went wrong searching for restaurants due to: {}", e);
            error_response(&e)
        }
    };
}

pub async fn retrieve_restaurant(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
    Path(id): Path<usize>,
) -> impl IntoResponse {
    let restaurant_res = michelin_service
        .get_restaurant(id)
        .await;

    into_json_response(restaurant_res, "retrieving restaurant")
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct RestaurantNameParam {
    pub name: String,
}

pub async fn retrieve_restaurant_by_name(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
    Query(query): Query<RestaurantNameParam>,
) -> impl IntoResponse {
    let restaurant_res = michelin_service
        .get_restaurant_by_name(&query.name)
        .await;

    into_json_response(restaurant_res, "retrieving restaurant by name")
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct RecommendationParam {
    pub n: Option<usize>,
}

pub async fn recommend_restaurants(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
    Path(id): Path<usize>,
    Query(query): Query<RecommendationParam>,
) -> impl IntoResponse {
    let recommendations_res = michelin_service
        .recommend(id, query.n.unwrap_or(DEFAULT_RECOMMENDATIONS))
        .await;

    into_json_response(recommendations_res, "recommending restaurants")
}

pub async fn refresh_dataset(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
) -> impl IntoResponse {
    let refresh_res = michelin_service.refresh().await;

    into_json_response(refresh_res, "refreshing the restaurant dataset")
}
