use crate::models::restaurant::{Location, RestaurantRecord, BIB_GOURMAND, ONE_STAR, THREE_STARS, TWO_STARS};
use crate::services::geo::distance_between;

/// Price tier assumed for records without a price, the most expensive one.
pub const WORST_PRICE_TIER: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueScore {
    pub value_score: f64,
    pub award_value: f64,
    pub price_tier: usize,
}

/// Weight of an award tier, zero for anything outside the vocabulary.
pub fn award_value(award: &str) -> f64 {
    match award {
        THREE_STARS => 3.0,
        TWO_STARS => 2.0,
        ONE_STAR => 1.0,
        BIB_GOURMAND => 0.5,
        _ => 0.0,
    }
}

/// `None` when the record has no recognised award and cannot be valued.
pub fn value_score(record: &RestaurantRecord) -> Option<ValueScore> {
    if !record.has_award() {
        return None;
    }
    let award_value = award_value(&record.award);
    if award_value <= 0.0 {
        return None;
    }
    let price_tier = record.price_tier().unwrap_or(WORST_PRICE_TIER);

    Some(ValueScore {
        value_score: award_value / price_tier as f64,
        award_value,
        price_tier,
    })
}

/// Distance from `center` for every record that has coordinates, nearest first.
/// Equal distances keep input order.
pub fn by_distance<'a, I>(records: I, center: Location) -> Vec<(&'a RestaurantRecord, f64)>
where
    I: IntoIterator<Item = &'a RestaurantRecord>,
{
    let mut scored: Vec<(&RestaurantRecord, f64)> = records
        .into_iter()
        .filter_map(|record| {
            record
                .coordinates
                .map(|coordinates| (record, distance_between(center, coordinates)))
        })
        .collect();

    scored.sort_by(|a, b| a.1.total_cmp(&b.1));
    scored
}

pub fn nearest<'a, I>(records: I, center: Location, limit: usize) -> Vec<(&'a RestaurantRecord, f64)>
where
    I: IntoIterator<Item = &'a RestaurantRecord>,
{
    let mut scored = by_distance(records, center);
    scored.truncate(limit);
    scored
}

/// Records no further than `radius_km` from `center`, nearest first, limited after sorting.
pub fn within_radius<'a, I>(
    records: I,
    center: Location,
    radius_km: f64,
    limit: usize,
) -> Vec<(&'a RestaurantRecord, f64)>
where
    I: IntoIterator<Item = &'a RestaurantRecord>,
{
    let mut scored = by_distance(records, center);
    scored.retain(|(_, distance)| *distance <= radius_km);
    scored.truncate(limit);
    scored
}

/// Best award-to-price ratio first, records without a recognised award are skipped.
pub fn best_value<'a, I>(records: I, limit: usize) -> Vec<(&'a RestaurantRecord, ValueScore)>
where
    I: IntoIterator<Item = &'a RestaurantRecord>,
{
    let mut scored: Vec<(&RestaurantRecord, ValueScore)> = records
        .into_iter()
        .filter_map(|record| value_score(record).map(|score| (record, score)))
        .collect();

    scored.sort_by(|a, b| b.1.value_score.total_cmp(&a.1.value_score));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::restaurant::fixtures::record;

    fn at(id: usize, lat: f64, lng: f64) -> RestaurantRecord {
        let mut restaurant = record(id, &format!("r{id}"));
        restaurant.coordinates = Some(Location { lat, lng });
        restaurant
    }

    fn priced(id: usize, award: &str, price: &str) -> RestaurantRecord {
        let mut restaurant = record(id, &format!("r{id}"));
        restaurant.award = award.to_string();
        restaurant.price = price.to_string();
        restaurant
    }

    #[test]
    fn nearest_returns_closest_first() {
        let records = vec![at(0, 10.0, 10.0), at(1, 0.0, 0.0)];
        let hits = nearest(&records, Location { lat: 0.0, lng: 0.0 }, 1);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0.id, 1);
        assert_eq!(hits[0].1, 0.0);
    }

    #[test]
    fn records_without_coordinates_are_never_ranked() {
        let records = vec![record(0, "nowhere"), at(1, 5.0, 5.0)];
        let hits = nearest(&records, Location { lat: 0.0, lng: 0.0 }, 10);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0.id, 1);
    }

    #[test]
    fn equal_distances_keep_input_order() {
        let records = vec![at(0, 1.0, 0.0), at(1, -1.0, 0.0), at(2, 0.0, 1.0)];
        let hits = nearest(&records, Location { lat: 0.0, lng: 0.0 }, 3);

        let ids: Vec<usize> = hits.iter().map(|(record, _)| record.id).collect();
        assert_eq!(ids[..2].to_vec(), vec![0, 1]);
    }

    #[test]
    fn radius_filters_before_limiting() {
        let records = vec![at(0, 0.5, 0.0), at(1, 0.0, 0.0), at(2, 3.0, 0.0), at(3, 0.2, 0.0)];
        let hits = within_radius(&records, Location { lat: 0.0, lng: 0.0 }, 100.0, 10);

        let ids: Vec<usize> = hits.iter().map(|(record, _)| record.id).collect();
        assert_eq!(ids, vec![1, 3, 0]);
        assert!(hits.iter().all(|(_, distance)| *distance <= 100.0));

        let limited = within_radius(&records, Location { lat: 0.0, lng: 0.0 }, 100.0, 2);
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn best_value_scores_award_against_price() {
        let records = vec![
            priced(0, "3 Stars", "$$"),
            priced(1, "1 Star", "$"),
            priced(2, "", "$"),
        ];
        let hits = best_value(&records, 10);

        let ranked: Vec<(usize, f64)> = hits.iter().map(|(record, score)| (record.id, score.value_score)).collect();
        assert_eq!(ranked, vec![(0, 1.5), (1, 1.0)]);
    }

    #[test]
    fn missing_price_counts_as_the_worst_tier() {
        let score = value_score(&priced(0, "2 Stars", "")).unwrap();
        assert_eq!(score.price_tier, WORST_PRICE_TIER);
        assert_eq!(score.value_score, 0.5);
    }

    #[test]
    fn unrecognised_awards_are_excluded() {
        let records = vec![priced(0, "Selected Restaurants", "$"), priced(1, "Bib Gourmand", "$$")];
        let hits = best_value(&records, 10);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0.id, 1);
        assert_eq!(hits[0].1.value_score, 0.25);
    }

    #[test]
    fn empty_input_ranks_to_empty_output() {
        let records: Vec<RestaurantRecord> = Vec::new();
        assert!(best_value(&records, 5).is_empty());
        assert!(nearest(&records, Location { lat: 0.0, lng: 0.0 }, 5).is_empty());
    }
}
