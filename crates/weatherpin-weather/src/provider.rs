//! Current-weather provider backed by WeatherAPI.com.

use crate::types::PlaceName;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct WaResponse {
    current: WaCurrent,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
}

/// Client for the WeatherAPI.com `current.json` endpoint.
///
/// The lookup is keyed by place name, and the only field consumed from the
/// response is the current temperature in Celsius.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    http: Client,
    base_url: String,
}

impl WeatherApiProvider {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build weather client, using defaults: {}", e);
                Client::new()
            });

        Self {
            api_key: api_key.into(),
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch the current temperature for a place.
    ///
    /// Returns `None` on transport failure, a non-OK status, or a response
    /// that does not carry `current.temp_c` - the caller cannot tell these
    /// apart, every one of them is a failed lookup.
    pub async fn current_temp_c(&self, place: &PlaceName) -> Option<f64> {
        let url = format!("{}/v1/current.json", self.base_url);
        let query = place.to_string();

        let response = match self
            .http
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query.as_str()),
                ("aqi", "no"),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Weather request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(
                "Weather request for {:?} returned status {}",
                query,
                response.status()
            );
            return None;
        }

        match response.json::<WaResponse>().await {
            Ok(body) => Some(body.current.temp_c),
            Err(e) => {
                tracing::debug!("Weather response parse error: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn parses_current_temperature() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .and(query_param("key", "test_key"))
            .and(query_param("q", "Springfield"))
            .and(query_param("aqi", "no"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "location": { "name": "Springfield", "country": "USA" },
                "current": { "temp_c": 21.5, "humidity": 40 }
            })))
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::new("test_key", server.uri());
        let temp = provider
            .current_temp_c(&PlaceName::Named("Springfield".to_string()))
            .await;

        assert_eq!(temp, Some(21.5));
    }

    #[tokio::test]
    async fn empty_body_is_a_failed_lookup() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::new("test_key", server.uri());
        let temp = provider
            .current_temp_c(&PlaceName::Named("Springfield".to_string()))
            .await;

        assert_eq!(temp, None);
    }

    #[tokio::test]
    async fn non_ok_status_is_a_failed_lookup() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": { "code": 2006, "message": "API key is invalid." }
            })))
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::new("bad_key", server.uri());
        let temp = provider
            .current_temp_c(&PlaceName::Named("Springfield".to_string()))
            .await;

        assert_eq!(temp, None);
    }

    #[tokio::test]
    async fn unknown_place_is_still_queried_verbatim() {
        let server = MockServer::start().await;

        // The unresolved-place marker flows into the query string exactly
        // as the display string, and the API rejects it.
        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .and(query_param("q", "City not found"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "code": 1006, "message": "No matching location found." }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::new("test_key", server.uri());
        let temp = provider.current_temp_c(&PlaceName::Unknown).await;

        assert_eq!(temp, None);
    }
}
