use std::collections::{BTreeMap, HashMap};
use crate::models::restaurant::{RestaurantRecord, AWARD_TIERS};
use crate::models::search::AwardPriceAverages;
use crate::services::filter::{self, contains_lowercase, lowercase_terms, Predicate};

const VEGETARIAN_TERMS: [&str; 3] = ["vegetarian", "vegan", "plant-based"];

/// Cuisines served by fewer restaurants than this are considered rare.
pub const RARE_CUISINE_THRESHOLD: usize = 5;

fn optional_location(location: Option<&str>) -> Option<Predicate> {
    location
        .filter(|location| !location.is_empty())
        .map(|location| filter::location_contains(location.to_lowercase()))
}

fn take<'a>(records: impl Iterator<Item = &'a RestaurantRecord>, limit: usize) -> Vec<&'a RestaurantRecord> {
    records.take(limit).collect()
}

/// Rank of the standard `$` to `$$$$` price strings, anything else is unranked.
pub fn price_rank(price: &str) -> Option<usize> {
    match price {
        "$" => Some(1),
        "$$" => Some(2),
        "$$$" => Some(3),
        "$$$$" => Some(4),
        _ => None,
    }
}

/// Cheapest first, unranked prices last. An empty match is an empty list,
/// never an error.
pub fn most_affordable<'a>(
    records: &'a [RestaurantRecord],
    cuisine: Option<&str>,
    location: Option<&str>,
    limit: usize,
) -> Vec<&'a RestaurantRecord> {
    let mut predicates: Vec<Predicate> = Vec::new();
    if let Some(cuisine) = cuisine.filter(|cuisine| !cuisine.is_empty()) {
        predicates.push(filter::cuisine_contains(cuisine.to_lowercase()));
    }
    predicates.extend(optional_location(location));

    let mut matches = filter::apply(records, &predicates);
    matches.sort_by_key(|record| match price_rank(&record.price) {
        Some(rank) => (false, rank),
        None => (true, 0),
    });
    matches.truncate(limit);
    matches
}

/// Exact award match, unlike the substring award criterion of a search.
pub fn by_award<'a>(
    records: &'a [RestaurantRecord],
    award: &str,
    location: Option<&str>,
) -> Vec<&'a RestaurantRecord> {
    let award = award.to_string();
    let mut predicates: Vec<Predicate> = Vec::new();
    predicates.push(Box::new(move |record: &RestaurantRecord| record.award == award));
    predicates.extend(optional_location(location));

    filter::apply(records, &predicates)
}

/// Restaurants whose facilities mention every requested facility, case
/// insensitively. No match yields an empty list.
pub fn by_facilities<'a>(
    records: &'a [RestaurantRecord],
    facilities: &[String],
    location: Option<&str>,
    limit: usize,
) -> Vec<&'a RestaurantRecord> {
    let mut predicates: Vec<Predicate> = vec![filter::facilities_contain_all(lowercase_terms(facilities))];
    predicates.extend(optional_location(location));

    let mut matches = filter::apply(records, &predicates);
    matches.truncate(limit);
    matches
}

pub fn vegetarian_friendly<'a>(
    records: &'a [RestaurantRecord],
    location: Option<&str>,
    limit: usize,
) -> Vec<&'a RestaurantRecord> {
    let location = optional_location(location);
    take(
        records.iter().filter(|record| {
            location.as_ref().map_or(true, |predicate| predicate(*record))
                && VEGETARIAN_TERMS
                    .iter()
                    .any(|term| contains_lowercase(&record.description, term))
        }),
        limit,
    )
}

pub fn by_dietary<'a>(records: &'a [RestaurantRecord], dietary: &str, limit: usize) -> Vec<&'a RestaurantRecord> {
    let dietary = dietary.to_lowercase();
    take(
        records
            .iter()
            .filter(|record| contains_lowercase(&record.description, &dietary)),
        limit,
    )
}

/// Records whose price tier lies within the inclusive bounds. A record without a
/// price never satisfies a bound.
pub fn by_price_range<'a>(
    records: &'a [RestaurantRecord],
    min_tier: Option<usize>,
    max_tier: Option<usize>,
    location: Option<&str>,
) -> Vec<&'a RestaurantRecord> {
    let mut predicates: Vec<Predicate> = Vec::new();
    predicates.extend(optional_location(location));
    if let Some(min_tier) = min_tier {
        predicates.push(Box::new(move |record: &RestaurantRecord| {
            record.price_tier().is_some_and(|tier| tier >= min_tier)
        }));
    }
    if let Some(max_tier) = max_tier {
        predicates.push(Box::new(move |record: &RestaurantRecord| {
            record.price_tier().is_some_and(|tier| tier <= max_tier)
        }));
    }

    filter::apply(records, &predicates)
}

/// Average price tier per award bucket for every location that has at least
/// one restaurant. Empty buckets average to zero.
pub fn compare_prices_by_location(
    records: &[RestaurantRecord],
    locations: &[String],
) -> BTreeMap<String, AwardPriceAverages> {
    let mut comparison = BTreeMap::new();

    for location in locations {
        let needle = location.to_lowercase();
        let in_location: Vec<&RestaurantRecord> = records
            .iter()
            .filter(|record| contains_lowercase(&record.location, &needle))
            .collect();
        if in_location.is_empty() {
            continue;
        }

        let mut tiers: HashMap<&str, Vec<usize>> = AWARD_TIERS.iter().map(|award| (*award, Vec::new())).collect();
        for record in in_location {
            if let (Some(bucket), Some(tier)) = (tiers.get_mut(record.award.as_str()), record.price_tier()) {
                bucket.push(tier);
            }
        }

        let averages: AwardPriceAverages = tiers
            .into_iter()
            .map(|(award, tiers)| {
                let average = if tiers.is_empty() {
                    0.0
                } else {
                    tiers.iter().sum::<usize>() as f64 / tiers.len() as f64
                };
                (award.to_string(), average)
            })
            .collect();
        comparison.insert(location.clone(), averages);
    }

    comparison
}

pub fn by_area<'a>(records: &'a [RestaurantRecord], area: &str, limit: usize) -> Vec<&'a RestaurantRecord> {
    let area = area.to_lowercase();
    take(
        records
            .iter()
            .filter(|record| contains_lowercase(&record.location, &area)),
        limit,
    )
}

/// Restaurants whose cuisine field mentions every requested cuisine.
pub fn multiple_cuisines<'a>(
    records: &'a [RestaurantRecord],
    cuisines: &[String],
    limit: usize,
) -> Vec<&'a RestaurantRecord> {
    let cuisines = lowercase_terms(cuisines);
    take(
        records.iter().filter(|record| {
            let cuisine = record.cuisine.to_lowercase();
            cuisines.iter().all(|term| cuisine.contains(term.as_str()))
        }),
        limit,
    )
}

/// Restaurants serving at least one cuisine found in fewer than
/// [`RARE_CUISINE_THRESHOLD`] restaurants, with those rare cuisines.
pub fn unique_cuisines(records: &[RestaurantRecord], limit: usize) -> Vec<(&RestaurantRecord, Vec<String>)> {
    let mut cuisine_counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        for cuisine in record.cuisines() {
            *cuisine_counts.entry(cuisine).or_insert(0) += 1;
        }
    }

    records
        .iter()
        .filter_map(|record| {
            let rare: Vec<String> = record
                .cuisines()
                .filter(|cuisine| cuisine_counts.get(cuisine).is_some_and(|count| *count < RARE_CUISINE_THRESHOLD))
                .map(str::to_string)
                .collect();
            (!rare.is_empty()).then_some((record, rare))
        })
        .take(limit)
        .collect()
}

/// A single award string of the guide never holds both a star tier and a Bib
/// Gourmand, so with the current vocabulary this matches nothing.
pub fn multiple_awards(records: &[RestaurantRecord]) -> Vec<&RestaurantRecord> {
    records
        .iter()
        .filter(|record| record.award.contains("Stars") && record.award.contains("Bib Gourmand"))
        .collect()
}

pub fn green_stars(records: &[RestaurantRecord], limit: usize) -> Vec<&RestaurantRecord> {
    take(records.iter().filter(|record| record.has_green_star), limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::restaurant::fixtures::record;

    fn restaurant(id: usize, location: &str, award: &str, price: &str, cuisine: &str) -> RestaurantRecord {
        let mut record = record(id, &format!("r{id}"));
        record.location = location.to_string();
        record.award = award.to_string();
        record.price = price.to_string();
        record.cuisine = cuisine.to_string();
        record
    }

    fn ids(records: &[&RestaurantRecord]) -> Vec<usize> {
        records.iter().map(|record| record.id).collect()
    }

    #[test]
    fn most_affordable_sorts_unranked_prices_last() {
        let records = vec![
            restaurant(0, "Paris", "1 Star", "$$$", "French"),
            restaurant(1, "Paris", "1 Star", "€€", "French"),
            restaurant(2, "Paris", "1 Star", "$", "French"),
            restaurant(3, "Lyon", "1 Star", "$$", "French"),
        ];

        assert_eq!(ids(&most_affordable(&records, None, Some("paris"), 10)), vec![2, 0, 1]);
        assert_eq!(ids(&most_affordable(&records, Some("french"), None, 2)), vec![2, 3]);
    }

    #[test]
    fn by_award_is_exact() {
        let records = vec![
            restaurant(0, "Tokyo", "3 Stars", "$$$$", ""),
            restaurant(1, "Tokyo", "2 Stars", "$$$$", ""),
        ];
        assert_eq!(ids(&by_award(&records, "3 Stars", None)), vec![0]);
        assert!(by_award(&records, "Stars", None).is_empty());
    }

    #[test]
    fn price_range_excludes_unpriced_records() {
        let records = vec![
            restaurant(0, "Rome", "", "$", ""),
            restaurant(1, "Rome", "", "$$$", ""),
            restaurant(2, "Rome", "", "", ""),
        ];
        assert_eq!(ids(&by_price_range(&records, Some(2), None, None)), vec![1]);
        assert_eq!(ids(&by_price_range(&records, None, Some(2), Some("rome"))), vec![0]);
        assert_eq!(ids(&by_price_range(&records, None, None, None)), vec![0, 1, 2]);
    }

    #[test]
    fn compare_prices_averages_each_award_bucket() {
        let records = vec![
            restaurant(0, "Paris, France", "1 Star", "$$", ""),
            restaurant(1, "Paris, France", "1 Star", "$$$$", ""),
            restaurant(2, "Paris, France", "Bib Gourmand", "$", ""),
            restaurant(3, "Lyon, France", "3 Stars", "$$$$", ""),
        ];
        let comparison = compare_prices_by_location(&records, &["Paris".to_string(), "Oslo".to_string()]);

        assert_eq!(comparison.len(), 1);
        let paris = &comparison["Paris"];
        assert_eq!(paris["1 Star"], 3.0);
        assert_eq!(paris["Bib Gourmand"], 1.0);
        assert_eq!(paris["3 Stars"], 0.0);
        assert_eq!(paris["2 Stars"], 0.0);
    }

    #[test]
    fn multiple_cuisines_requires_every_cuisine() {
        let records = vec![
            restaurant(0, "", "", "", "Japanese, French"),
            restaurant(1, "", "", "", "Japanese"),
        ];
        let cuisines = vec!["french".to_string(), "japanese".to_string()];
        assert_eq!(ids(&multiple_cuisines(&records, &cuisines, 10)), vec![0]);
    }

    #[test]
    fn unique_cuisines_reports_rare_ones() {
        let mut records: Vec<RestaurantRecord> = (0..5).map(|id| restaurant(id, "", "", "", "French")).collect();
        records.push(restaurant(5, "", "", "", "French, Basque"));

        let hits = unique_cuisines(&records, 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0.id, 5);
        assert_eq!(hits[0].1, vec!["Basque".to_string()]);
    }

    #[test]
    fn multiple_awards_matches_nothing_in_the_vocabulary() {
        let records: Vec<RestaurantRecord> = AWARD_TIERS
            .iter()
            .enumerate()
            .map(|(id, award)| restaurant(id, "", award, "$", ""))
            .collect();
        assert!(multiple_awards(&records).is_empty());
    }

    #[test]
    fn vegetarian_friendly_checks_description_terms() {
        let mut veg = record(0, "Green");
        veg.description = "A Plant-Based tasting menu".to_string();
        veg.location = "Berlin".to_string();
        let mut meat = record(1, "Grill");
        meat.description = "Dry aged beef".to_string();
        meat.location = "Berlin".to_string();
        let records = vec![veg, meat];

        assert_eq!(ids(&vegetarian_friendly(&records, Some("berlin"), 10)), vec![0]);
        assert!(vegetarian_friendly(&records, Some("madrid"), 10).is_empty());
        assert_eq!(ids(&by_dietary(&records, "BEEF", 10)), vec![1]);
    }

    #[test]
    fn facilities_and_green_stars_respect_limits() {
        let mut records: Vec<RestaurantRecord> = (0..3).map(|id| restaurant(id, "Oslo", "", "", "")).collect();
        for record in records.iter_mut() {
            record.facilities_and_services = "Terrace,Car park".to_string();
            record.has_green_star = true;
        }

        let facilities = vec!["car park".to_string()];
        assert_eq!(ids(&by_facilities(&records, &facilities, Some("oslo"), 2)), vec![0, 1]);
        assert_eq!(ids(&green_stars(&records, 1)), vec![0]);
        assert_eq!(ids(&by_area(&records, "OSLO", 10)), vec![0, 1, 2]);
    }
}
