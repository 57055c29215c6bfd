use serde::{Deserialize, Serialize};

/// Geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// One fix from the platform position stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionUpdate {
    pub coordinate: Coordinate,
    pub accuracy_m: Option<f64>,
}

/// A reverse-geocoded place.
///
/// `Unknown` is a valid terminal state (the service answered, but had no
/// candidate for the coordinate) and is distinct from a transport failure,
/// which geocoding reports as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceName {
    Named(String),
    Unknown,
}

impl std::fmt::Display for PlaceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaceName::Named(name) => f.write_str(name),
            PlaceName::Unknown => f.write_str("City not found"),
        }
    }
}

/// Requested accuracy tier for the position stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accuracy {
    /// Highest available accuracy.
    #[default]
    Exact,
    Street,
    City,
}

/// Options for opening a position subscription.
///
/// The movement threshold is distance-based, not time-based: the platform
/// service reports a new fix only after the device has moved at least this
/// far.
#[derive(Debug, Clone, Copy)]
pub struct WatchOptions {
    pub distance_interval_m: u32,
    pub accuracy: Accuracy,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            distance_interval_m: 100,
            accuracy: Accuracy::Exact,
        }
    }
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}
