//! Reverse geocoding: convert coordinates to human-readable place names.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use crate::types::{Coordinate, PlaceName};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "WeatherPin/0.1.0 (https://github.com/weatherpin)";

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    /// Nominatim reports "no result" as a 200 with an `error` field.
    error: Option<String>,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state: Option<String>,
    county: Option<String>,
    country: Option<String>,
}

impl NominatimAddress {
    /// Selection policy: prefer a city-level name, fall back to the
    /// region, then the country.
    fn place_name(self) -> Option<String> {
        self.city
            .or(self.town)
            .or(self.village)
            .or(self.municipality)
            .or(self.state)
            .or(self.county)
            .or(self.country)
    }
}

/// Client for the Nominatim reverse-geocoding endpoint.
#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    client: Client,
    base_url: String,
}

impl ReverseGeocoder {
    pub fn new() -> Self {
        Self {
            client: build_client(),
            base_url: NOMINATIM_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub fn new_with_base_url(base_url: &str) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.to_string(),
        }
    }

    /// Reverse geocode a coordinate to a place name.
    ///
    /// Returns `Some(PlaceName::Unknown)` when the service has no candidate
    /// for the coordinate, and `None` on transport or decode failure; the
    /// failure is logged, not surfaced distinctly.
    pub async fn resolve_place(&self, coordinate: Coordinate) -> Option<PlaceName> {
        let url = format!("{}/reverse", self.base_url);

        let response = match self
            .client
            .get(&url)
            .query(&[
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
            ])
            .query(&[
                ("format", "json"),
                ("addressdetails", "1"),
                ("layer", "address"),
                ("zoom", "10"),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return None;
        }

        let body: NominatimResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode parse error: {}", e);
                return None;
            }
        };

        if let Some(error) = body.error {
            tracing::debug!("Reverse geocode had no candidates: {}", error);
            return Some(PlaceName::Unknown);
        }

        match body.address.and_then(NominatimAddress::place_name) {
            Some(name) => {
                tracing::info!("Reverse geocoded to: {}", name);
                Some(PlaceName::Named(name))
            }
            None => Some(PlaceName::Unknown),
        }
    }
}

impl Default for ReverseGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

fn build_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to build geocoding client, using defaults: {}", e);
            Client::new()
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn coordinate() -> Coordinate {
        Coordinate::new(57.0488, 9.9217)
    }

    #[tokio::test]
    async fn resolves_city_from_address() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("lat", "57.0488"))
            .and(query_param("lon", "9.9217"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "address": {
                    "city": "Aalborg",
                    "state": "North Denmark Region",
                    "country": "Denmark"
                }
            })))
            .mount(&server)
            .await;

        let geocoder = ReverseGeocoder::new_with_base_url(&server.uri());
        let place = geocoder.resolve_place(coordinate()).await;

        assert_eq!(place, Some(PlaceName::Named("Aalborg".to_string())));
    }

    #[tokio::test]
    async fn falls_back_to_region_then_country() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "address": {
                    "state": "North Denmark Region",
                    "country": "Denmark"
                }
            })))
            .mount(&server)
            .await;

        let geocoder = ReverseGeocoder::new_with_base_url(&server.uri());
        let place = geocoder.resolve_place(coordinate()).await;

        assert_eq!(
            place,
            Some(PlaceName::Named("North Denmark Region".to_string()))
        );
    }

    #[tokio::test]
    async fn no_candidates_is_unknown_not_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": "Unable to geocode"
            })))
            .mount(&server)
            .await;

        let geocoder = ReverseGeocoder::new_with_base_url(&server.uri());
        assert_eq!(
            geocoder.resolve_place(coordinate()).await,
            Some(PlaceName::Unknown)
        );
    }

    #[tokio::test]
    async fn empty_address_is_unknown() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "address": {}
            })))
            .mount(&server)
            .await;

        let geocoder = ReverseGeocoder::new_with_base_url(&server.uri());
        assert_eq!(
            geocoder.resolve_place(coordinate()).await,
            Some(PlaceName::Unknown)
        );
    }

    #[tokio::test]
    async fn server_error_is_a_transport_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let geocoder = ReverseGeocoder::new_with_base_url(&server.uri());
        assert_eq!(geocoder.resolve_place(coordinate()).await, None);
    }

    #[tokio::test]
    async fn malformed_body_is_a_transport_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let geocoder = ReverseGeocoder::new_with_base_url(&server.uri());
        assert_eq!(geocoder.resolve_place(coordinate()).await, None);
    }
}
