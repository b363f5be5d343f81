use crate::models::restaurant::RestaurantRecord;
use crate::models::search::SearchCriteria;

/// A single criterion. Predicates own their (already lower-cased) needles.
pub type Predicate = Box<dyn Fn(&RestaurantRecord) -> bool + Send + Sync>;

/// Case-insensitive substring test, `needle` must already be lower case.
pub fn contains_lowercase(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn active_term(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
}

pub fn free_text(query: String) -> Predicate {
    Box::new(move |record| {
        contains_lowercase(&record.name, &query)
            || contains_lowercase(&record.cuisine, &query)
            || contains_lowercase(&record.description, &query)
    })
}

pub fn cuisine_contains(cuisine: String) -> Predicate {
    Box::new(move |record| contains_lowercase(&record.cuisine, &cuisine))
}

pub fn location_contains(location: String) -> Predicate {
    Box::new(move |record| contains_lowercase(&record.location, &location))
}

pub fn award_contains(award: String) -> Predicate {
    Box::new(move |record| contains_lowercase(&record.award, &award))
}

/// Exact comparison, `$$` must not match `$$$`.
pub fn price_equals(price: String) -> Predicate {
    Box::new(move |record| record.price == price)
}

pub fn green_star_equals(has_green_star: bool) -> Predicate {
    Box::new(move |record| record.has_green_star == has_green_star)
}

/// Every term has to appear in the facilities field.
pub fn facilities_contain_all(terms: Vec<String>) -> Predicate {
    Box::new(move |record| {
        let facilities = record.facilities_and_services.to_lowercase();
        terms.iter().all(|term| facilities.contains(term.as_str()))
    })
}

/// Translates criteria into predicates, skipping the absent ones.
pub fn build_predicates(criteria: &SearchCriteria) -> Vec<Predicate> {
    let mut predicates: Vec<Predicate> = Vec::new();

    if let Some(query) = active_term(&criteria.query) {
        predicates.push(free_text(query));
    }
    if let Some(cuisine) = active_term(&criteria.cuisine) {
        predicates.push(cuisine_contains(cuisine));
    }
    if let Some(price) = criteria.price.as_ref().filter(|price| !price.is_empty()) {
        predicates.push(price_equals(price.clone()));
    }
    if let Some(location) = active_term(&criteria.location) {
        predicates.push(location_contains(location));
    }
    if let Some(award) = active_term(&criteria.award) {
        predicates.push(award_contains(award));
    }
    if let Some(has_green_star) = criteria.has_green_star {
        predicates.push(green_star_equals(has_green_star));
    }
    if let Some(facilities) = &criteria.facilities {
        let terms = lowercase_terms(facilities);
        if !terms.is_empty() {
            predicates.push(facilities_contain_all(terms));
        }
    }

    predicates
}

/// Lower-cases a list of terms and drops blank entries.
pub fn lowercase_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}

pub fn matches_all(predicates: &[Predicate], record: &RestaurantRecord) -> bool {
    predicates.iter().all(|predicate| predicate(record))
}

/// Order preserving subset of `records` satisfying every predicate.
pub fn apply<'a>(records: &'a [RestaurantRecord], predicates: &[Predicate]) -> Vec<&'a RestaurantRecord> {
    records
        .iter()
        .filter(|record| matches_all(predicates, record))
        .collect()
}

pub fn filter<'a>(records: &'a [RestaurantRecord], criteria: &SearchCriteria) -> Vec<&'a RestaurantRecord> {
    apply(records, &build_predicates(criteria))
}
