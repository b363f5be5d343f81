use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use serde_with::formats::CommaSeparator;
use serde_with::{serde_as, StringWithSeparator};
use crate::models::restaurant::RestaurantRecord;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Optional, independently togglable filters. Absent or blank values are no-ops,
/// present ones are combined with AND.
#[serde_as]
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct SearchCriteria {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub award: Option<String>,
    #[serde(default)]
    pub has_green_star: Option<bool>,
    #[serde_as(as = "Option<StringWithSeparator::<CommaSeparator, String>>")]
    pub facilities: Option<Vec<String>>,
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_page_size")]
    pub limit: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            ..Default::default()
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct SearchResult {
    pub results: Vec<RestaurantRecord>,
    pub total: usize,
    pub skip: usize,
    pub limit: usize,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct DistanceHit {
    pub restaurant: RestaurantRecord,
    pub distance_km: f64,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ValueHit {
    pub restaurant: RestaurantRecord,
    pub value_score: f64,
    pub award_value: f64,
    pub price_tier: usize,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct RareCuisineHit {
    pub restaurant: RestaurantRecord,
    pub rare_cuisines: Vec<String>,
}

/// Average price tier per award bucket, keyed by award name.
pub type AwardPriceAverages = BTreeMap<String, f64>;
