use serde::{Deserialize, Serialize};

/// Award tiers in the Michelin guide vocabulary.
pub const THREE_STARS: &str = "3 Stars";
pub const TWO_STARS: &str = "2 Stars";
pub const ONE_STAR: &str = "1 Star";
pub const BIB_GOURMAND: &str = "Bib Gourmand";

pub const AWARD_TIERS: [&str; 4] = [THREE_STARS, TWO_STARS, ONE_STAR, BIB_GOURMAND];

/// One normalized dataset row. Every textual field defaults to an empty
/// string, so matching code never has to null-check.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct RestaurantRecord {
    pub id: usize,
    pub name: String,
    pub address: String,
    pub location: String,
    pub coordinates: Option<Location>,
    pub cuisine: String,
    pub price: String,
    pub award: String,
    pub has_green_star: bool,
    pub green_star: u32,
    pub description: String,
    pub facilities_and_services: String,
    pub facilities: Vec<String>,
    pub phone_number: String,
    pub michelin_url: Option<String>,
    pub website_url: Option<String>,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    /// Accepts only finite coordinates inside the valid latitude/longitude ranges.
    pub fn checked(lat: f64, lng: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);

        valid.then_some(Location { lat, lng })
    }
}

impl RestaurantRecord {
    /// Price tier is the number of currency symbols, not a parsed amount.
    pub fn price_tier(&self) -> Option<usize> {
        match self.price.chars().count() {
            0 => None,
            tier => Some(tier),
        }
    }

    pub fn has_award(&self) -> bool {
        !self.award.is_empty()
    }

    /// Text the similarity index is fitted on.
    pub fn similarity_text(&self) -> String {
        format!("{} {} {}", self.name, self.cuisine, self.description)
    }

    /// Individual cuisines of a comma separated cuisine field.
    pub fn cuisines(&self) -> impl Iterator<Item = &str> {
        self.cuisine
            .split(',')
            .map(str::trim)
            .filter(|cuisine| !cuisine.is_empty())
    }
}
