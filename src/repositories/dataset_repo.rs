use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use crate::models::restaurant::{Location, RestaurantRecord};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::similarity::SimilarityIndex;

/// Column contract of the Michelin guide CSV export.
pub const REQUIRED_COLUMNS: [&str; 14] = [
    "Name",
    "Address",
    "Location",
    "Price",
    "Cuisine",
    "Longitude",
    "Latitude",
    "PhoneNumber",
    "Url",
    "WebsiteUrl",
    "Award",
    "GreenStar",
    "FacilitiesAndServices",
    "Description",
];

#[derive(Clone, Debug)]
pub enum DatasetSource {
    Url(String),
    File(PathBuf),
    Inline(String),
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::Url(url) => write!(f, "{}", url),
            DatasetSource::File(path) => write!(f, "{}", path.display()),
            DatasetSource::Inline(text) => write!(f, "inline dataset ({} bytes)", text.len()),
        }
    }
}

/// Immutable snapshot shared by every query until the next refresh.
#[derive(Debug)]
pub struct Dataset {
    pub records: Vec<RestaurantRecord>,
    pub similarity: SimilarityIndex,
    pub loaded_at: OffsetDateTime,
}

impl Dataset {
    pub fn from_records(records: Vec<RestaurantRecord>) -> Self {
        let similarity = SimilarityIndex::fit(&records);
        Self {
            records,
            similarity,
            loaded_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn get(&self, id: usize) -> Option<&RestaurantRecord> {
        self.records.get(id)
    }
}

struct LoadFailure {
    reason: String,
    at: OffsetDateTime,
}

#[derive(Default)]
struct LoadState {
    snapshot: Option<Arc<Dataset>>,
    // survives a failed refresh that keeps the previous snapshot
    last_failure: Option<LoadFailure>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct DatasetStatus {
    pub state: String,
    pub records: usize,
    #[serde(with = "time::serde::rfc3339::option")]
    pub loaded_at: Option<OffsetDateTime>,
    pub last_error: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub failed_at: Option<OffsetDateTime>,
    pub fetch_attempts: usize,
}

pub struct DatasetRepo {
    source: DatasetSource,
    client: reqwest::Client,
    state: RwLock<LoadState>,
    // single-flight guard for fetches, held across the whole load
    load_guard: Mutex<()>,
    fetch_attempts: AtomicUsize,
}

impl DatasetRepo {
    pub fn new(
        source: DatasetSource,
        fetch_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .context("Failed to build the dataset HTTP client")?;

        Ok(Self {
            source,
            client,
            state: RwLock::new(LoadState::default()),
            load_guard: Mutex::new(()),
            fetch_attempts: AtomicUsize::new(0),
        })
    }

    /// Returns the cached snapshot, loading it on first use. Concurrent first
    /// callers share one fetch. A failure is not cached, the next call retries.
    pub async fn load(&self) -> ServiceResult<Arc<Dataset>> {
        if let Some(dataset) = self.cached().await {
            return Ok(dataset);
        }

        let _guard = self.load_guard.lock().await;
        if let Some(dataset) = self.cached().await {
            return Ok(dataset);
        }

        self.fetch_and_store("load").await
    }

    /// Builds a fresh snapshot and swaps it in. In-flight queries keep the
    /// snapshot they already hold, a failed refresh keeps the old one.
    pub async fn refresh(&self) -> ServiceResult<Arc<Dataset>> {
        let _guard = self.load_guard.lock().await;
        self.fetch_and_store("refresh").await
    }

    pub async fn status(&self) -> DatasetStatus {
        let fetch_attempts = self.fetch_attempts.load(Ordering::SeqCst);
        let state = self.state.read().await;

        let (state_name, records, loaded_at) = match (&state.snapshot, &state.last_failure) {
            (Some(dataset), _) => ("loaded", dataset.records.len(), Some(dataset.loaded_at)),
            (None, Some(_)) => ("failed", 0, None),
            (None, None) => ("unloaded", 0, None),
        };

        DatasetStatus {
            state: state_name.to_string(),
            records,
            loaded_at,
            last_error: state.last_failure.as_ref().map(|failure| failure.reason.clone()),
            failed_at: state.last_failure.as_ref().map(|failure| failure.at),
            fetch_attempts,
        }
    }

    async fn cached(&self) -> Option<Arc<Dataset>> {
        self.state.read().await.snapshot.clone()
    }

    async fn fetch_and_store(&self, action: &str) -> ServiceResult<Arc<Dataset>> {
        match self.build_snapshot().await {
            Ok(dataset) => {
                let dataset = Arc::new(dataset);
                let mut state = self.state.write().await;
                state.snapshot = Some(dataset.clone());
                state.last_failure = None;
                Ok(dataset)
            }
            Err(e) => {
                warn!("Failed to {} restaurant dataset from {} due to: {:#}", action, self.source, e);
                self.state.write().await.last_failure = Some(LoadFailure {
                    reason: format!("{:#}", e),
                    at: OffsetDateTime::now_utc(),
                });
                Err(ServiceError::from(e))
            }
        }
    }

    async fn build_snapshot(&self) -> anyhow::Result<Dataset> {
        let text = self.fetch().await?;

        // parsing and fitting the similarity index are CPU bound
        let dataset = tokio::task::spawn_blocking(move || -> anyhow::Result<Dataset> {
            let records = parse_dataset(&text)?;
            Ok(Dataset::from_records(records))
        })
            .await
            .context("Dataset build task did not complete")??;

        info!(
            "Loaded {} restaurants from {} ({} similarity terms)",
            dataset.records.len(),
            self.source,
            dataset.similarity.vocabulary_size()
        );
        Ok(dataset)
    }

    async fn fetch(&self) -> anyhow::Result<String> {
        self.fetch_attempts.fetch_add(1, Ordering::SeqCst);
        info!("Fetching restaurant dataset from {}", self.source);

        match &self.source {
            DatasetSource::Url(url) => {
                let response = self.client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("Failed to request {}", url))?
                    .error_for_status()
                    .with_context(|| format!("Dataset source {} returned an error status", url))?;

                response
                    .text()
                    .await
                    .context("Failed to read the dataset response body")
            }
            DatasetSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display())),
            DatasetSource::Inline(text) => Ok(text.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Address")]
    address: Option<String>,
    #[serde(rename = "Location")]
    location: Option<String>,
    #[serde(rename = "Price")]
    price: Option<String>,
    #[serde(rename = "Cuisine")]
    cuisine: Option<String>,
    #[serde(rename = "Longitude")]
    longitude: Option<String>,
    #[serde(rename = "Latitude")]
    latitude: Option<String>,
    #[serde(rename = "PhoneNumber")]
    phone_number: Option<String>,
    #[serde(rename = "Url")]
    url: Option<String>,
    #[serde(rename = "WebsiteUrl")]
    website_url: Option<String>,
    #[serde(rename = "Award")]
    award: Option<String>,
    #[serde(rename = "GreenStar")]
    green_star: Option<String>,
    #[serde(rename = "FacilitiesAndServices")]
    facilities_and_services: Option<String>,
    #[serde(rename = "Description")]
    description: Option<String>,
}

/// Parses the CSV export into normalized records, ids follow row order.
pub fn parse_dataset(text: &str) -> anyhow::Result<Vec<RestaurantRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers().context("Failed to read the CSV header")?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|header| header.trim() == *column))
        .collect();
    if !missing.is_empty() {
        bail!("Dataset is missing columns: {}", missing.join(", "));
    }

    let mut records = Vec::new();
    for (id, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(|e| anyhow!("Failed to decode CSV row {}: {}", id + 1, e))?;
        records.push(parse_row_into_restaurant(id, row));
    }

    Ok(records)
}

fn parse_row_into_restaurant(
    id: usize,
    row: CsvRow,
) -> RestaurantRecord {
    let facilities_and_services = text(row.facilities_and_services);
    let facilities = facilities_and_services
        .split(',')
        .map(str::trim)
        .filter(|facility| !facility.is_empty())
        .map(str::to_string)
        .collect();
    let green_star = parse_green_star(row.green_star.as_deref());

    RestaurantRecord {
        id,
        name: text(row.name),
        address: text(row.address),
        location: text(row.location),
        coordinates: parse_coordinates(row.latitude.as_deref(), row.longitude.as_deref()),
        cuisine: text(row.cuisine),
        price: text(row.price),
        award: text(row.award),
        has_green_star: green_star > 0,
        green_star,
        description: text(row.description),
        facilities_and_services,
        facilities,
        phone_number: parse_phone_number(row.phone_number),
        michelin_url: optional_text(row.url),
        website_url: optional_text(row.website_url),
    }
}

fn text(value: Option<String>) -> String {
    value.map(|value| value.trim().to_string()).unwrap_or_default()
}

fn optional_text(value: Option<String>) -> Option<String> {
    Some(text(value)).filter(|value| !value.is_empty())
}

/// Exports that typed the column as a float leave a trailing `.0`.
fn parse_phone_number(value: Option<String>) -> String {
    let phone = text(value);
    match phone.strip_suffix(".0") {
        Some(stripped) => stripped.to_string(),
        None => phone,
    }
}

fn parse_coordinates(latitude: Option<&str>, longitude: Option<&str>) -> Option<Location> {
    let lat = latitude?.trim().parse::<f64>().ok()?;
    let lng = longitude?.trim().parse::<f64>().ok()?;
    Location::checked(lat, lng)
}

fn parse_green_star(value: Option<&str>) -> u32 {
    let Some(value) = value.map(str::trim) else {
        return 0;
    };
    if value.eq_ignore_ascii_case("true") {
        return 1;
    }
    match value.parse::<f64>() {
        Ok(count) if count.is_finite() && count > 0.0 => (count as u32).max(1),
        _ => 0,
    }
}
