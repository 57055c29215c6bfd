//! Windows position backend (WinRT Geolocation).

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use windows::Devices::Geolocation::{
    GeolocationAccessStatus, Geolocator, PositionAccuracy, PositionChangedEventArgs,
};
use windows::Foundation::TypedEventHandler;

use crate::location::{LocationSource, LocationSubscription};
use crate::types::{Accuracy, Coordinate, LocationError, PositionUpdate, WatchOptions};

fn desired_accuracy(accuracy: Accuracy) -> PositionAccuracy {
    match accuracy {
        Accuracy::Exact | Accuracy::Street => PositionAccuracy::High,
        Accuracy::City => PositionAccuracy::Default,
    }
}

#[derive(Debug, Default)]
pub struct WindowsSource;

impl WindowsSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LocationSource for WindowsSource {
    async fn watch(&self, options: WatchOptions) -> Result<LocationSubscription, LocationError> {
        let access = Geolocator::RequestAccessAsync()
            .and_then(|op| op.get())
            .map_err(|e| LocationError::Other(e.to_string()))?;

        if access != GeolocationAccessStatus::Allowed {
            return Err(LocationError::PermissionDenied);
        }

        let locator = Geolocator::new().map_err(|e| LocationError::Other(e.to_string()))?;
        locator
            .SetDesiredAccuracy(desired_accuracy(options.accuracy))
            .map_err(|e| LocationError::Other(e.to_string()))?;
        locator
            .SetMovementThreshold(f64::from(options.distance_interval_m))
            .map_err(|e| LocationError::Other(e.to_string()))?;

        let (tx, rx) = mpsc::channel(16);
        let handler = TypedEventHandler::new(
            move |_sender: &Option<Geolocator>, args: &Option<PositionChangedEventArgs>| {
                if let Some(args) = args {
                    if let Ok(update) = position_update(args) {
                        let _ = tx.try_send(update);
                    }
                }
                Ok(())
            },
        );

        let token = locator
            .PositionChanged(&handler)
            .map_err(|e| LocationError::Other(e.to_string()))?;
        tracing::info!(
            distance_threshold_m = options.distance_interval_m,
            "Windows position stream started"
        );

        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            task_cancel.cancelled().await;
            if let Err(e) = locator.RemovePositionChanged(token) {
                tracing::debug!("failed to remove position handler: {}", e);
            }
        });

        Ok(LocationSubscription::new(rx, cancel))
    }
}

fn position_update(args: &PositionChangedEventArgs) -> windows::core::Result<PositionUpdate> {
    let coordinate = args.Position()?.Coordinate()?;
    let point = coordinate.Point()?.Position()?;

    Ok(PositionUpdate {
        coordinate: Coordinate::new(point.Latitude, point.Longitude),
        accuracy_m: coordinate.Accuracy().ok(),
    })
}
