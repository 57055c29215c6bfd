//! External-service clients for WeatherPin
//!
//! Reverse geocoding via Nominatim, current weather via WeatherAPI.com,
//! and the platform position stream exposed as a cancellable subscription.

pub mod geocode;
pub mod location;
pub mod lookup;
pub mod provider;
pub mod types;

#[cfg(target_os = "linux")]
pub mod geoclue;
#[cfg(windows)]
pub mod windows_backend;

pub use geocode::ReverseGeocoder;
pub use location::{system_source, LocationSource, LocationSubscription};
pub use lookup::{LookupOutcome, WeatherLookup};
pub use provider::WeatherApiProvider;
pub use types::*;
