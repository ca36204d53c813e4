//! OpenWeatherMap source.
//!
//! Two GET calls per fetch: `/weather` for current conditions and
//! `/forecast` for the 3-hourly outlook. The forecast is thinned to three
//! samples per day (morning, afternoon, evening) over at most five days,
//! which is plenty for a packing answer and keeps prompts small. A failed
//! forecast call degrades to current-conditions-only instead of failing
//! the fetch.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Timelike};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};
use wayfinder_core::error::FetchError;
use wayfinder_core::external::{CurrentConditions, ForecastEntry, WeatherReport, WeatherSource};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// UTC hours kept from the 3-hourly forecast.
const SAMPLED_HOURS: [u32; 3] = [9, 15, 21];
const FORECAST_DAYS: usize = 5;

pub struct OpenWeatherSource {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenWeatherSource {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        location: &str,
    ) -> Result<T, FetchError> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", location),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(e.to_string())
                } else {
                    FetchError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(FetchError::LocationNotFound(location.to_string()));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "OpenWeatherMap API error");
            return Err(FetchError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }

    /// Thin the 3-hourly list to the sampled hours, grouped and ordered by
    /// day, capped at [`FORECAST_DAYS`].
    fn filter_forecast(rows: Vec<ForecastRow>) -> Vec<ForecastEntry> {
        let mut by_day: BTreeMap<NaiveDate, Vec<ForecastEntry>> = BTreeMap::new();

        for row in rows {
            let Some(at) = DateTime::from_timestamp(row.dt, 0) else {
                continue;
            };
            if !SAMPLED_HOURS.contains(&at.hour()) {
                continue;
            }
            by_day.entry(at.date_naive()).or_default().push(ForecastEntry {
                at,
                temperature_c: round_tenth(row.main.temp),
                description: first_description(&row.weather),
                precipitation_chance: row.pop,
            });
        }

        by_day.into_values().take(FORECAST_DAYS).flatten().collect()
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherSource {
    async fn fetch(&self, location: &str) -> Result<WeatherReport, FetchError> {
        let current: CurrentRow = self.get_json("weather", location).await?;

        // A missing forecast still leaves a usable report.
        let forecast = match self.get_json::<ForecastBody>("forecast", location).await {
            Ok(body) => Self::filter_forecast(body.list),
            Err(e) => {
                warn!(error = %e, location, "Forecast fetch failed, keeping current conditions only");
                Vec::new()
            }
        };

        let resolved = if current.sys.country.is_empty() {
            current.name.clone()
        } else {
            format!("{}, {}", current.name, current.sys.country)
        };

        let report = WeatherReport {
            location: resolved,
            current: Some(CurrentConditions {
                temperature_c: round_tenth(current.main.temp),
                feels_like_c: round_tenth(current.main.feels_like),
                humidity_pct: current.main.humidity,
                description: first_description(&current.weather),
                wind_speed_ms: current.wind.speed,
            }),
            forecast,
        };

        info!(
            location = %report.location,
            forecast_samples = report.forecast.len(),
            "Weather fetched"
        );
        debug!(current = ?report.current, "Current conditions");

        Ok(report)
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// First condition description, capitalized the way the upstream's own
/// apps display it.
fn first_description(rows: &[ConditionRow]) -> String {
    let raw = rows.first().map(|c| c.description.as_str()).unwrap_or("");
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// --- OpenWeatherMap wire types ---

#[derive(Debug, Deserialize)]
struct CurrentRow {
    name: String,
    #[serde(default)]
    sys: SysRow,
    main: MainRow,
    #[serde(default)]
    weather: Vec<ConditionRow>,
    #[serde(default)]
    wind: WindRow,
}

#[derive(Debug, Default, Deserialize)]
struct SysRow {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct MainRow {
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    #[serde(default)]
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct ConditionRow {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct WindRow {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastBody {
    #[serde(default)]
    list: Vec<ForecastRow>,
}

#[derive(Debug, Deserialize)]
struct ForecastRow {
    dt: i64,
    main: MainRow,
    #[serde(default)]
    weather: Vec<ConditionRow>,
    /// Probability of precipitation in [0, 1].
    #[serde(default)]
    pop: f64,
}
