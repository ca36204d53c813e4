//! Geoapify attractions source.
//!
//! Two-step lookup: Nominatim turns the free-form place name into
//! coordinates (it wants an identifying User-Agent and returns lat/lon as
//! strings), then Geoapify's Places API lists tourist attractions within a
//! fixed radius, sorted by popularity.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};
use wayfinder_core::error::FetchError;
use wayfinder_core::external::{Attraction, AttractionsReport, AttractionsSource};

const DEFAULT_GEOCODE_URL: &str = "https://nominatim.openstreetmap.org/search";
const DEFAULT_PLACES_URL: &str = "https://api.geoapify.com/v2/places";

/// Nominatim's usage policy requires an identifying agent.
const GEOCODE_USER_AGENT: &str = "wayfinder/0.1 (travel assistant)";

const SEARCH_RADIUS_M: u32 = 10_000;
const RESULT_LIMIT: u32 = 5;

/// Geoapify place categories, broad tourism down to specific sight types.
const TOURISM_CATEGORIES: &str = "tourism,tourism.information,tourism.attraction,\
tourism.attraction.artwork,tourism.attraction.viewpoint,tourism.attraction.fountain,\
tourism.sights,tourism.sights.place_of_worship,tourism.sights.monastery,\
tourism.sights.city_hall,tourism.sights.bridge,tourism.sights.castle,\
tourism.sights.ruines,tourism.sights.archaeological_site,tourism.sights.memorial,\
tourism.sights.memorial.monument,tourism.sights.tower,tourism.sights.fort,\
tourism.sights.lighthouse,tourism.sights.windmill";

pub struct GeoapifySource {
    api_key: String,
    geocode_url: String,
    places_url: String,
    client: reqwest::Client,
}

impl GeoapifySource {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key: api_key.into(),
            geocode_url: DEFAULT_GEOCODE_URL.into(),
            places_url: DEFAULT_PLACES_URL.into(),
            client,
        }
    }

    /// Create with custom endpoints (e.g., for testing or proxies).
    pub fn with_urls(
        mut self,
        geocode_url: impl Into<String>,
        places_url: impl Into<String>,
    ) -> Self {
        self.geocode_url = geocode_url.into().trim_end_matches('/').to_string();
        self.places_url = places_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn geocode(&self, location: &str) -> Result<(f64, f64), FetchError> {
        let response = self
            .client
            .get(&self.geocode_url)
            .query(&[("q", location), ("format", "json"), ("limit", "1")])
            .header("User-Agent", GEOCODE_USER_AGENT)
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
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Geocoding API error");
            return Err(FetchError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let rows: Vec<GeocodeRow> = response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::LocationNotFound(location.to_string()))?;
        row.coordinates()
    }

    async fn places(&self, lat: f64, lon: f64) -> Result<Vec<PlaceFeature>, FetchError> {
        let filter = format!("circle:{lon},{lat},{SEARCH_RADIUS_M}");
        let limit = RESULT_LIMIT.to_string();

        let response = self
            .client
            .get(&self.places_url)
            .query(&[
                ("categories", TOURISM_CATEGORIES),
                ("filter", filter.as_str()),
                ("limit", limit.as_str()),
                ("sort", "popularity"),
                ("apiKey", self.api_key.as_str()),
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
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Places API error");
            return Err(FetchError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let body: PlacesBody = response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))?;
        Ok(body.features)
    }
}

#[async_trait]
impl AttractionsSource for GeoapifySource {
    async fn fetch(&self, location: &str) -> Result<AttractionsReport, FetchError> {
        let (lat, lon) = self.geocode(location).await?;
        debug!(location, lat, lon, "Location geocoded");

        let features = self.places(lat, lon).await?;
        let attractions: Vec<Attraction> = features
            .into_iter()
            .map(|feature| feature.properties.into_attraction())
            .collect();

        info!(location, count = attractions.len(), "Attractions fetched");

        Ok(AttractionsReport {
            location: location.to_string(),
            total_found: attractions.len(),
            attractions,
        })
    }
}

// --- Wire types ---

/// Nominatim serializes coordinates as strings.
#[derive(Debug, Deserialize)]
struct GeocodeRow {
    lat: String,
    lon: String,
}

impl GeocodeRow {
    fn coordinates(&self) -> Result<(f64, f64), FetchError> {
        let lat: f64 = self
            .lat
            .parse()
            .map_err(|_| FetchError::Malformed(format!("bad latitude {:?}", self.lat)))?;
        let lon: f64 = self
            .lon
            .parse()
            .map_err(|_| FetchError::Malformed(format!("bad longitude {:?}", self.lon)))?;
        Ok((lat, lon))
    }
}

#[derive(Debug, Deserialize)]
struct PlacesBody {
    #[serde(default)]
    features: Vec<PlaceFeature>,
}

#[derive(Debug, Deserialize)]
struct PlaceFeature {
    properties: PlaceProperties,
}

#[derive(Debug, Default, Deserialize)]
struct PlaceProperties {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    formatted: Option<String>,
    #[serde(default)]
    distance: Option<f64>,
}

impl PlaceProperties {
    fn into_attraction(self) -> Attraction {
        Attraction {
            name: self
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Unnamed".to_string()),
            categories: self.categories,
            address: self.formatted,
            distance_m: self.distance.map(|d| d.round() as u32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geocode_rows_parse_string_coordinates() {
        let json = r#"[{"lat": "48.8566", "lon": "2.3522", "display_name": "Paris, France"}]"#;
        let rows: Vec<GeocodeRow> = serde_json::from_str(json).unwrap();
        let (lat, lon) = rows[0].coordinates().unwrap();

        assert!((lat - 48.8566).abs() < 1e-9);
        assert!((lon - 2.3522).abs() < 1e-9);
    }

    #[test]
    fn unparseable_coordinates_are_malformed() {
        let row = GeocodeRow {
            lat: "not-a-number".into(),
            lon: "2.0".into(),
        };
        assert!(matches!(
            row.coordinates(),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn place_features_map_to_attractions() {
        let json = r#"{
            "features": [{
                "properties": {
                    "name": "Eiffel Tower",
                    "categories": ["tourism", "tourism.attraction"],
                    "formatted": "Eiffel Tower, Avenue Anatole France, Paris",
                    "distance": 1234.6
                }
            }]
        }"#;
        let body: PlacesBody = serde_json::from_str(json).unwrap();
        let attraction = body.features.into_iter().next().unwrap().properties.into_attraction();

        assert_eq!(attraction.name, "Eiffel Tower");
        assert_eq!(attraction.categories.len(), 2);
        assert_eq!(attraction.distance_m, Some(1235));
        assert!(attraction.address.unwrap().contains("Paris"));
    }

    #[test]
    fn nameless_places_fall_back_to_unnamed() {
        let properties = PlaceProperties {
            name: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(properties.into_attraction().name, "Unnamed");
    }

    #[test]
    fn empty_features_parse_to_empty_list() {
        let body: PlacesBody = serde_json::from_str(r#"{"features": []}"#).unwrap();
        assert!(body.features.is_empty());

        let body: PlacesBody = serde_json::from_str("{}").unwrap();
        assert!(body.features.is_empty());
    }

    #[test]
    fn category_list_is_well_formed() {
        assert!(TOURISM_CATEGORIES.starts_with("tourism,"));
        assert!(!TOURISM_CATEGORIES.contains(' '));
        assert!(TOURISM_CATEGORIES.split(',').all(|c| c.starts_with("tourism")));
    }
}
