//! External data payloads and the fetcher/cache seams.
//!
//! Fetchers return typed reports; the cache owns freshness. A payload past
//! its TTL reads as absent, so everything downstream can trust
//! "payload present" to mean "fresh enough".

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::verdict::ExternalDataKind;

/// Current conditions at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub description: String,
    pub wind_speed_ms: f64,
}

/// One sampled forecast point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub at: DateTime<Utc>,
    pub temperature_c: f64,
    pub description: String,

    /// Probability of precipitation in [0, 1].
    pub precipitation_chance: f64,
}

/// Weather for a location: current conditions plus a short forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: String,
    pub current: Option<CurrentConditions>,
    pub forecast: Vec<ForecastEntry>,
}

impl WeatherReport {
    /// Whether the report carries a reading the gate can put in front of
    /// the renderer.
    pub fn has_usable_current(&self) -> bool {
        self.current.is_some()
    }
}

/// A single point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub name: String,
    pub categories: Vec<String>,
    pub address: Option<String>,
    pub distance_m: Option<u32>,
}

/// Points of interest near a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractionsReport {
    pub location: String,
    pub attractions: Vec<Attraction>,

    /// How many the upstream reported before truncation.
    pub total_found: usize,
}

/// A fetched external report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExternalReport {
    Weather(WeatherReport),
    Attractions(AttractionsReport),
}

impl ExternalReport {
    pub fn kind(&self) -> ExternalDataKind {
        match self {
            ExternalReport::Weather(_) => ExternalDataKind::Weather,
            ExternalReport::Attractions(_) => ExternalDataKind::Attractions,
        }
    }
}

/// A report plus the freshness bookkeeping the cache needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalPayload {
    pub report: ExternalReport,
    pub fetched_at: DateTime<Utc>,
    pub ttl_secs: u64,
}

impl ExternalPayload {
    pub fn new(report: ExternalReport, ttl_secs: u64) -> Self {
        Self {
            report,
            fetched_at: Utc::now(),
            ttl_secs,
        }
    }

    pub fn kind(&self) -> ExternalDataKind {
        self.report.kind()
    }

    /// Whether this payload has outlived its TTL at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.fetched_at) >= TimeDelta::seconds(self.ttl_secs as i64)
    }
}

/// Fetches live weather for a free-form location name.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<WeatherReport, FetchError>;
}

/// Fetches points of interest for a free-form location name.
#[async_trait]
pub trait AttractionsSource: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<AttractionsReport, FetchError>;
}

/// Keyed TTL cache for fetched payloads.
///
/// `get` must treat expired entries as absent; callers never re-check
/// timestamps themselves.
#[async_trait]
pub trait PayloadCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<ExternalPayload>;
    async fn put(&self, key: &str, payload: ExternalPayload);
}
