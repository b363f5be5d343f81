use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use crate::models::restaurant::{Location, RestaurantRecord};
use crate::models::search::{AwardPriceAverages, DistanceHit, RareCuisineHit, SearchCriteria, SearchResult, ValueHit};
use crate::repositories::dataset_repo::{Dataset, DatasetRepo, DatasetStatus};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::filter::{self, Predicate};
use crate::services::pagination::paginate;
use crate::services::{finders, ranking};

/// Query surface over the restaurant dataset. Every operation works on the
/// snapshot it obtained from the repository and never mutates it.
pub struct MichelinService {
    repo: DatasetRepo,
    max_page_size: usize,
}

fn owned(records: Vec<&RestaurantRecord>) -> Vec<RestaurantRecord> {
    records.into_iter().cloned().collect()
}

fn round_km(distance: f64) -> f64 {
    (distance * 100.0).round() / 100.0
}

impl MichelinService {
    pub fn new(
        repo: DatasetRepo,
        max_page_size: usize,
    ) -> Self {
        Self {
            repo,
            max_page_size: max_page_size.max(1),
        }
    }

    async fn dataset(&self) -> ServiceResult<Arc<Dataset>> {
        self.repo.load().await
    }

    pub async fn dataset_status(&self) -> DatasetStatus {
        self.repo.status().await
    }

    pub async fn refresh(&self) -> ServiceResult<DatasetStatus> {
        self.repo.refresh().await?;
        Ok(self.repo.status().await)
    }

    fn validate_limit(&self, limit: usize) -> ServiceResult<()> {
        if limit == 0 {
            return Err(ServiceError::InvalidCriteria("limit must be greater than zero".to_string()));
        }
        if limit > self.max_page_size {
            return Err(ServiceError::InvalidCriteria(format!(
                "limit must not exceed {}",
                self.max_page_size
            )));
        }
        Ok(())
    }

    fn validate_center(latitude: f64, longitude: f64) -> ServiceResult<Location> {
        Location::checked(latitude, longitude).ok_or_else(|| {
            ServiceError::InvalidCriteria(format!(
                "coordinates ({}, {}) are outside the valid latitude/longitude range",
                latitude, longitude
            ))
        })
    }

    fn validate_terms(name: &str, terms: &[String]) -> ServiceResult<()> {
        if filter::lowercase_terms(terms).is_empty() {
            return Err(ServiceError::InvalidCriteria(format!("{} must not be empty", name)));
        }
        Ok(())
    }

    /// Filters, then windows the matches. `total` counts every match.
    pub async fn search(&self, criteria: &SearchCriteria) -> ServiceResult<SearchResult> {
        self.validate_limit(criteria.limit)?;
        let dataset = self.dataset().await?;

        let matches = filter::filter(&dataset.records, criteria);
        let (window, total) = paginate(&matches, criteria.skip, criteria.limit);
        if total == 0 {
            debug!("Search matched no restaurants, criteria could be relaxed: {:?}", criteria);
        }

        Ok(SearchResult {
            results: owned(window),
            total,
            skip: criteria.skip,
            limit: criteria.limit,
        })
    }

    pub async fn get_restaurant(&self, id: usize) -> ServiceResult<RestaurantRecord> {
        let dataset = self.dataset().await?;
        dataset
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("restaurant {}", id)))
    }

    pub async fn get_restaurant_by_name(&self, name: &str) -> ServiceResult<RestaurantRecord> {
        let dataset = self.dataset().await?;
        dataset
            .records
            .iter()
            .find(|record| record.name == name)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("restaurant named {}", name)))
    }

    /// Closest restaurants with coordinates, distances rounded to 10 meters.
    pub async fn nearest(&self, latitude: f64, longitude: f64, limit: usize) -> ServiceResult<Vec<DistanceHit>> {
        self.validate_limit(limit)?;
        let center = Self::validate_center(latitude, longitude)?;
        let dataset = self.dataset().await?;

        Ok(ranking::nearest(&dataset.records, center, limit)
            .into_iter()
            .map(|(record, distance)| DistanceHit {
                restaurant: record.clone(),
                distance_km: round_km(distance),
            })
            .collect())
    }

    pub async fn within_radius(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
        limit: usize,
    ) -> ServiceResult<Vec<DistanceHit>> {
        self.validate_limit(limit)?;
        let center = Self::validate_center(latitude, longitude)?;
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(ServiceError::InvalidCriteria(format!("invalid radius {}", radius_km)));
        }
        let dataset = self.dataset().await?;

        Ok(ranking::within_radius(&dataset.records, center, radius_km, limit)
            .into_iter()
            .map(|(record, distance_km)| DistanceHit {
                restaurant: record.clone(),
                distance_km,
            })
            .collect())
    }

    pub async fn best_value(&self, location: Option<&str>, limit: usize) -> ServiceResult<Vec<ValueHit>> {
        self.validate_limit(limit)?;
        let dataset = self.dataset().await?;

        let mut predicates: Vec<Predicate> = Vec::new();
        if let Some(location) = location.filter(|location| !location.is_empty()) {
            predicates.push(filter::location_contains(location.to_lowercase()));
        }
        let candidates = filter::apply(&dataset.records, &predicates);

        Ok(ranking::best_value(candidates, limit)
            .into_iter()
            .map(|(record, score)| ValueHit {
                restaurant: record.clone(),
                value_score: score.value_score,
                award_value: score.award_value,
                price_tier: score.price_tier,
            })
            .collect())
    }

    /// The `n` restaurants whose name, cuisine and description read most alike.
    pub async fn recommend(&self, id: usize, n: usize) -> ServiceResult<Vec<RestaurantRecord>> {
        if n > self.max_page_size {
            return Err(ServiceError::InvalidCriteria(format!(
                "at most {} recommendations can be requested",
                self.max_page_size
            )));
        }
        let dataset = self.dataset().await?;

        let similar = dataset
            .similarity
            .most_similar(id, n)
            .ok_or_else(|| ServiceError::NotFound(format!("restaurant {}", id)))?;

        Ok(similar
            .into_iter()
            .filter_map(|(position, _)| dataset.get(position).cloned())
            .collect())
    }

    pub async fn most_affordable(
        &self,
        cuisine: Option<&str>,
        location: Option<&str>,
        limit: usize,
    ) -> ServiceResult<Vec<RestaurantRecord>> {
        self.validate_limit(limit)?;
        let dataset = self.dataset().await?;
        Ok(owned(finders::most_affordable(&dataset.records, cuisine, location, limit)))
    }

    pub async fn by_award(&self, award: &str, location: Option<&str>) -> ServiceResult<Vec<RestaurantRecord>> {
        let dataset = self.dataset().await?;
        Ok(owned(finders::by_award(&dataset.records, award, location)))
    }

    pub async fn by_facilities(
        &self,
        facilities: &[String],
        location: Option<&str>,
        limit: usize,
    ) -> ServiceResult<Vec<RestaurantRecord>> {
        Self::validate_terms("facilities", facilities)?;
        self.validate_limit(limit)?;
        let dataset = self.dataset().await?;
        Ok(owned(finders::by_facilities(&dataset.records, facilities, location, limit)))
    }

    pub async fn vegetarian_friendly(&self, location: Option<&str>, limit: usize) -> ServiceResult<Vec<RestaurantRecord>> {
        self.validate_limit(limit)?;
        let dataset = self.dataset().await?;
        Ok(owned(finders::vegetarian_friendly(&dataset.records, location, limit)))
    }

    pub async fn by_dietary(&self, dietary: &str, limit: usize) -> ServiceResult<Vec<RestaurantRecord>> {
        if dietary.trim().is_empty() {
            return Err(ServiceError::InvalidCriteria("dietary must not be empty".to_string()));
        }
        self.validate_limit(limit)?;
        let dataset = self.dataset().await?;
        Ok(owned(finders::by_dietary(&dataset.records, dietary, limit)))
    }

    pub async fn by_price_range(
        &self,
        min_tier: Option<usize>,
        max_tier: Option<usize>,
        location: Option<&str>,
    ) -> ServiceResult<Vec<RestaurantRecord>> {
        if let (Some(min_tier), Some(max_tier)) = (min_tier, max_tier) {
            if min_tier > max_tier {
                return Err(ServiceError::InvalidCriteria(format!(
                    "min_price {} is greater than max_price {}",
                    min_tier, max_tier
                )));
            }
        }
        let dataset = self.dataset().await?;
        Ok(owned(finders::by_price_range(&dataset.records, min_tier, max_tier, location)))
    }

    pub async fn compare_prices_by_location(
        &self,
        locations: &[String],
    ) -> ServiceResult<BTreeMap<String, AwardPriceAverages>> {
        Self::validate_terms("locations", locations)?;
        let dataset = self.dataset().await?;
        Ok(finders::compare_prices_by_location(&dataset.records, locations))
    }

    pub async fn by_area(&self, area: &str, limit: usize) -> ServiceResult<Vec<RestaurantRecord>> {
        self.validate_limit(limit)?;
        let dataset = self.dataset().await?;
        Ok(owned(finders::by_area(&dataset.records, area, limit)))
    }

    pub async fn multiple_cuisines(&self, cuisines: &[String], limit: usize) -> ServiceResult<Vec<RestaurantRecord>> {
        Self::validate_terms("cuisines", cuisines)?;
        self.validate_limit(limit)?;
        let dataset = self.dataset().await?;
        Ok(owned(finders::multiple_cuisines(&dataset.records, cuisines, limit)))
    }

    pub async fn unique_cuisines(&self, limit: usize) -> ServiceResult<Vec<RareCuisineHit>> {
        self.validate_limit(limit)?;
        let dataset = self.dataset().await?;
        Ok(finders::unique_cuisines(&dataset.records, limit)
            .into_iter()
            .map(|(record, rare_cuisines)| RareCuisineHit {
                restaurant: record.clone(),
                rare_cuisines,
            })
            .collect())
    }

    pub async fn multiple_awards(&self) -> ServiceResult<Vec<RestaurantRecord>> {
        let dataset = self.dataset().await?;
        Ok(owned(finders::multiple_awards(&dataset.records)))
    }

    pub async fn green_stars(&self, limit: usize) -> ServiceResult<Vec<RestaurantRecord>> {
        self.validate_limit(limit)?;
        let dataset = self.dataset().await?;
        Ok(owned(finders::green_stars(&dataset.records, limit)))
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{sample_service, service_with};
    use super::*;
    use crate::repositories::dataset_repo::fixtures::HEADER;

    fn names(records: &[RestaurantRecord]) -> Vec<&str> {
        records.iter().map(|record| record.name.as_str()).collect()
    }

    #[tokio::test]
    async fn search_reports_total_before_pagination() {
        let service = sample_service();
        let criteria = SearchCriteria {
            query: Some("sushi".to_string()),
            limit: 1,
            ..SearchCriteria::new()
        };

        let result = service.search(&criteria).await.unwrap();
        assert_eq!(result.total, 2);
        assert_eq!(names(&result.results), vec!["Sushi Saito"]);

        let next = service.search(&SearchCriteria { skip: 1, ..criteria }).await.unwrap();
        assert_eq!(names(&next.results), vec!["Sushi Kan"]);
    }

    #[tokio::test]
    async fn search_without_matches_is_empty_not_an_error() {
        let service = sample_service();
        let criteria = SearchCriteria {
            price: Some("$".to_string()),
            ..SearchCriteria::new()
        };

        let result = service.search(&criteria).await.unwrap();
        assert_eq!(result.total, 0);
        assert!(result.results.is_empty());
    }

    #[tokio::test]
    async fn invalid_limit_is_rejected_before_loading() {
        let service = sample_service();
        let criteria = SearchCriteria {
            limit: 0,
            ..SearchCriteria::new()
        };

        let err = service.search(&criteria).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCriteria(_)));
        assert_eq!(service.dataset_status().await.fetch_attempts, 0);
    }

    #[tokio::test]
    async fn nearest_rounds_distances_and_skips_missing_coordinates() {
        let service = sample_service();
        let hits = service.nearest(35.6654, 139.7394, 10).await.unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].restaurant.name, "Sushi Saito");
        assert_eq!(hits[0].distance_km, 0.0);
        assert_eq!(hits[1].restaurant.name, "Sushi Kan");
        assert!(hits.iter().all(|hit| hit.restaurant.name != "Old Tavern"));
    }

    #[tokio::test]
    async fn nearest_rejects_invalid_coordinates() {
        let service = sample_service();
        let err = service.nearest(120.0, 0.0, 5).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCriteria(_)));
    }

    #[tokio::test]
    async fn within_radius_keeps_only_close_restaurants() {
        let service = sample_service();
        let hits = service.within_radius(35.6654, 139.7394, 10.0, 10).await.unwrap();

        let names: Vec<&str> = hits.iter().map(|hit| hit.restaurant.name.as_str()).collect();
        assert_eq!(names, vec!["Sushi Saito", "Sushi Kan"]);

        assert!(service.within_radius(0.0, 0.0, -1.0, 10).await.is_err());
    }

    #[tokio::test]
    async fn best_value_ranks_by_award_per_price_tier() {
        let service = sample_service();
        let hits = service.best_value(None, 10).await.unwrap();

        let ranked: Vec<(&str, f64)> = hits
            .iter()
            .map(|hit| (hit.restaurant.name.as_str(), hit.value_score))
            .collect();
        assert_eq!(ranked, vec![("Sushi Saito", 0.75), ("Old Tavern", 1.0 / 3.0), ("Chez Marie", 0.25)]);

        let paris = service.best_value(Some("paris"), 10).await.unwrap();
        assert_eq!(paris.len(), 1);
        assert_eq!(paris[0].price_tier, 2);
    }

    #[tokio::test]
    async fn best_value_example_orders_and_excludes() {
        let csv = [
            HEADER,
            "A,,X,$$,,,,,,,3 Stars,0,,",
            "B,,X,$,,,,,,,1 Star,0,,",
            "C,,X,$,,,,,,,,0,,",
        ]
        .join("\n");
        let service = service_with(csv);

        let hits = service.best_value(None, 10).await.unwrap();
        let ranked: Vec<(&str, f64)> = hits
            .iter()
            .map(|hit| (hit.restaurant.name.as_str(), hit.value_score))
            .collect();
        assert_eq!(ranked, vec![("A", 1.5), ("B", 1.0)]);
    }

    #[tokio::test]
    async fn recommend_excludes_the_restaurant_itself() {
        let service = sample_service();
        let recommendations = service.recommend(0, 2).await.unwrap();

        assert_eq!(recommendations.len(), 2);
        assert_eq!(recommendations[0].name, "Sushi Kan");
        assert!(recommendations.iter().all(|record| record.id != 0));

        for id in 0..4 {
            let all = service.recommend(id, 10).await.unwrap();
            assert_eq!(all.len(), 3);
            assert!(all.iter().all(|record| record.id != id));
        }
    }

    #[tokio::test]
    async fn recommend_unknown_id_is_not_found() {
        let service = sample_service();
        let err = service.recommend(99, 3).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(service.recommend(1, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lookups_by_id_and_name() {
        let service = sample_service();
        assert_eq!(service.get_restaurant(1).await.unwrap().name, "Chez Marie");
        assert_eq!(service.get_restaurant_by_name("Old Tavern").await.unwrap().id, 2);
        assert!(matches!(service.get_restaurant(9).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(service.get_restaurant_by_name("old tavern").await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn finders_validate_their_inputs() {
        let service = sample_service();
        assert!(service.by_facilities(&[], None, 10).await.is_err());
        assert!(service.multiple_cuisines(&[" ".to_string()], 10).await.is_err());
        assert!(service.by_price_range(Some(3), Some(1), None).await.is_err());
        assert!(service.by_dietary("", 10).await.is_err());

        let priced = service.by_price_range(Some(3), None, None).await.unwrap();
        assert_eq!(names(&priced), vec!["Sushi Saito", "Old Tavern"]);
    }

    #[tokio::test]
    async fn unavailable_dataset_surfaces_as_error() {
        let service = service_with("not,a,michelin,export".to_string());
        let err = service.search(&SearchCriteria::new()).await.unwrap_err();
        assert!(matches!(err, ServiceError::DataUnavailable(_)));
        assert_eq!(service.dataset_status().await.state, "failed");
    }
}
