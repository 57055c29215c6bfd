//! The composed lookup: coordinate -> place name -> current temperature.

use crate::geocode::ReverseGeocoder;
use crate::provider::WeatherApiProvider;
use crate::types::{Coordinate, PlaceName};

/// Result of a successful lookup, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupOutcome {
    pub place: PlaceName,
    pub temperature_c: f64,
}

/// Resolves a long-pressed coordinate into a place and its current
/// temperature.
///
/// The composition is strictly sequential: the temperature fetch is keyed
/// by the resolved place name, so geocoding must complete first. Any
/// failure along the way collapses into `None`; place resolution and
/// weather fetch share one failure channel.
#[derive(Debug, Clone)]
pub struct WeatherLookup {
    geocoder: ReverseGeocoder,
    provider: WeatherApiProvider,
}

impl WeatherLookup {
    pub fn new(geocoder: ReverseGeocoder, provider: WeatherApiProvider) -> Self {
        Self { geocoder, provider }
    }

    pub async fn lookup(&self, coordinate: Coordinate) -> Option<LookupOutcome> {
        let place = self.geocoder.resolve_place(coordinate).await?;
        tracing::info!("Closest place: {}", place);

        let temperature_c = self.provider.current_temp_c(&place).await?;
        Some(LookupOutcome {
            place,
            temperature_c,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn lookup_against(server: &MockServer) -> WeatherLookup {
        WeatherLookup::new(
            ReverseGeocoder::new_with_base_url(&server.uri()),
            WeatherApiProvider::new("test_key", server.uri()),
        )
    }

    fn coordinate() -> Coordinate {
        Coordinate::new(39.78, -89.65)
    }

    #[tokio::test]
    async fn resolves_place_then_temperature() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "address": { "city": "Springfield", "country": "USA" }
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .and(query_param("q", "Springfield"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "current": { "temp_c": 18.0 }
            })))
            .mount(&server)
            .await;

        let outcome = lookup_against(&server).lookup(coordinate()).await;

        assert_eq!(
            outcome,
            Some(LookupOutcome {
                place: PlaceName::Named("Springfield".to_string()),
                temperature_c: 18.0,
            })
        );
    }

    #[tokio::test]
    async fn geocode_transport_failure_skips_the_weather_call() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        // Sequential composition: no place, no weather request.
        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "current": { "temp_c": 18.0 }
            })))
            .expect(0)
            .mount(&server)
            .await;

        assert_eq!(lookup_against(&server).lookup(coordinate()).await, None);
    }

    #[tokio::test]
    async fn unresolved_place_flows_into_the_weather_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": "Unable to geocode"
            })))
            .mount(&server)
            .await;

        // The marker is queried verbatim and fails, landing in the shared
        // failure channel.
        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .and(query_param("q", "City not found"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "code": 1006, "message": "No matching location found." }
            })))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(lookup_against(&server).lookup(coordinate()).await, None);
    }

    #[tokio::test]
    async fn malformed_weather_body_fails_the_lookup() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "address": { "city": "Springfield" }
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        assert_eq!(lookup_against(&server).lookup(coordinate()).await, None);
    }
}
