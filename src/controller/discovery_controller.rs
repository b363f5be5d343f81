use std::sync::Arc;
use axum::{Extension, Router};
use axum::extract::Query;
use axum::response::IntoResponse;
use axum::routing::get;
use serde::{Deserialize, Serialize};
use serde_with::formats::CommaSeparator;
use serde_with::{serde_as, StringWithSeparator};
use crate::controller::AppState;
use crate::helpers::service_response::into_json_response;
use crate::services::michelin_service::MichelinService;

const DEFAULT_NEAREST_LIMIT: usize = 5;
const DEFAULT_AFFORDABLE_LIMIT: usize = 5;
const DEFAULT_LIMIT: usize = 10;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/nearest", get(find_nearest))
        .route("/radius", get(find_within_radius))
        .route("/best-value", get(find_best_value))
        .route("/affordable", get(find_most_affordable))
        .route("/awards", get(find_by_award))
        .route("/awards/multiple", get(find_multiple_awards))
        .route("/green-stars", get(find_green_stars))
        .route("/facilities", get(find_by_facilities))
        .route("/amenities", get(find_by_facilities))
        .route("/features", get(find_by_facilities))
        .route("/services", get(find_by_facilities))
        .route("/vegetarian", get(find_vegetarian_friendly))
        .route("/dietary", get(find_by_dietary))
        .route("/price-range", get(find_by_price_range))
        .route("/price-comparison", get(compare_prices_by_location))
        .route("/area", get(find_by_area))
        .route("/cuisines/multiple", get(find_multiple_cuisines))
        .route("/cuisines/unique", get(find_unique_cuisines))
        .route_layer(Extension(app_state.michelin_service))
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct NearestParam {
    pub latitude: f64,
    pub longitude: f64,
    pub limit: Option<usize>,
}

pub async fn find_nearest(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
    Query(query): Query<NearestParam>,
) -> impl IntoResponse {
    let nearest_res = michelin_service
        .nearest(
            query.latitude,
            query.longitude,
            query.limit.unwrap_or(DEFAULT_NEAREST_LIMIT),
        ).await;

    into_json_response(nearest_res, "finding nearest restaurants")
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct RadiusParam {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    pub limit: Option<usize>,
}

pub async fn find_within_radius(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
    Query(query): Query<RadiusParam>,
) -> impl IntoResponse {
    let radius_res = michelin_service
        .within_radius(
            query.latitude,
            query.longitude,
            query.radius_km,
            query.limit.unwrap_or(DEFAULT_LIMIT),
        ).await;

    into_json_response(radius_res, "finding restaurants within radius")
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct LocationParam {
    pub location: Option<String>,
    pub limit: Option<usize>,
}

pub async fn find_best_value(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
    Query(query): Query<LocationParam>,
) -> impl IntoResponse {
    let best_value_res = michelin_service
        .best_value(
            query.location.as_deref(),
            query.limit.unwrap_or(DEFAULT_LIMIT),
        ).await;

    into_json_response(best_value_res, "ranking best value restaurants")
}

pub async fn find_vegetarian_friendly(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
    Query(query): Query<LocationParam>,
) -> impl IntoResponse {
    let vegetarian_res = michelin_service
        .vegetarian_friendly(
            query.location.as_deref(),
            query.limit.unwrap_or(DEFAULT_LIMIT),
        ).await;

    into_json_response(vegetarian_res, "finding vegetarian friendly restaurants")
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AffordableParam {
    pub cuisine: Option<String>,
    pub location: Option<String>,
    pub limit: Option<usize>,
}

pub async fn find_most_affordable(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
    Query(query): Query<AffordableParam>,
) -> impl IntoResponse {
    let affordable_res = michelin_service
        .most_affordable(
            query.cuisine.as_deref(),
            query.location.as_deref(),
            query.limit.unwrap_or(DEFAULT_AFFORDABLE_LIMIT),
        ).await;

    into_json_response(affordable_res, "finding affordable restaurants")
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AwardParam {
    pub award: String,
    pub location: Option<String>,
}

pub async fn find_by_award(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
    Query(query): Query<AwardParam>,
) -> impl IntoResponse {
    let award_res = michelin_service
        .by_award(&query.award, query.location.as_deref())
        .await;

    into_json_response(award_res, "finding restaurants by award")
}

pub async fn find_multiple_awards(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
) -> impl IntoResponse {
    into_json_response(michelin_service.multiple_awards().await, "finding restaurants with multiple awards")
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct LimitParam {
    pub limit: Option<usize>,
}

pub async fn find_green_stars(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
    Query(query): Query<LimitParam>,
) -> impl IntoResponse {
    let green_star_res = michelin_service
        .green_stars(query.limit.unwrap_or(DEFAULT_LIMIT))
        .await;

    into_json_response(green_star_res, "finding green star restaurants")
}

pub async fn find_unique_cuisines(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
    Query(query): Query<LimitParam>,
) -> impl IntoResponse {
    let unique_res = michelin_service
        .unique_cuisines(query.limit.unwrap_or(DEFAULT_LIMIT))
        .await;

    into_json_response(unique_res, "finding restaurants with rare cuisines")
}

#[serde_as]
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct FacilitiesParam {
    #[serde_as(as = "StringWithSeparator::<CommaSeparator, String>")]
    pub facilities: Vec<String>,
    pub location: Option<String>,
    pub limit: Option<usize>,
}

pub async fn find_by_facilities(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
    Query(query): Query<FacilitiesParam>,
) -> impl IntoResponse {
    let facilities_res = michelin_service
        .by_facilities(
            &query.facilities,
            query.location.as_deref(),
            query.limit.unwrap_or(DEFAULT_LIMIT),
        ).await;

    into_json_response(facilities_res, "finding restaurants by facilities")
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct DietaryParam {
    pub dietary: String,
    pub limit: Option<usize>,
}

pub async fn find_by_dietary(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
    Query(query): Query<DietaryParam>,
) -> impl IntoResponse {
    let dietary_res = michelin_service
        .by_dietary(&query.dietary, query.limit.unwrap_or(DEFAULT_LIMIT))
        .await;

    into_json_response(dietary_res, "finding restaurants by dietary option")
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct PriceRangeParam {
    pub min_price: Option<usize>,
    pub max_price: Option<usize>,
    pub location: Option<String>,
}

pub async fn find_by_price_range(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
    Query(query): Query<PriceRangeParam>,
) -> impl IntoResponse {
    let price_range_res = michelin_service
        .by_price_range(
            query.min_price,
            query.max_price,
            query.location.as_deref(),
        ).await;

    into_json_response(price_range_res, "finding restaurants by price range")
}

#[serde_as]
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct PriceComparisonParam {
    #[serde_as(as = "StringWithSeparator::<CommaSeparator, String>")]
    pub locations: Vec<String>,
}

pub async fn compare_prices_by_location(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
    Query(query): Query<PriceComparisonParam>,
) -> impl IntoResponse {
    let comparison_res = michelin_service
        .compare_prices_by_location(&query.locations)
        .await;

    into_json_response(comparison_res, "comparing prices by location")
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AreaParam {
    pub area: String,
    pub limit: Option<usize>,
}

pub async fn find_by_area(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
    Query(query): Query<AreaParam>,
) -> impl IntoResponse {
    let area_res = michelin_service
        .by_area(&query.area, query.limit.unwrap_or(DEFAULT_LIMIT))
        .await;

    into_json_response(area_res, "finding restaurants by area")
}

#[serde_as]
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct CuisinesParam {
    #[serde_as(as = "StringWithSeparator::<CommaSeparator, String>")]
    pub cuisines: Vec<String>,
    pub limit: Option<usize>,
}

pub async fn find_multiple_cuisines(
    Extension(michelin_service): Extension<Arc<MichelinService>>,
    Query(query): Query<CuisinesParam>,
) -> impl IntoResponse {
    let cuisines_res = michelin_service
        .multiple_cuisines(&query.cuisines, query.limit.unwrap_or(DEFAULT_LIMIT))
        .await;

    into_json_response(cuisines_res, "finding restaurants serving multiple cuisines")
}
