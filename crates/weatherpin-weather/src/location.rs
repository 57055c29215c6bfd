//! Platform position stream, exposed as a cancellable subscription.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::types::{LocationError, PositionUpdate, WatchOptions};

/// A source of continuous position updates.
///
/// `watch` requests platform permission as a side effect; a denial is
/// reported as `LocationError::PermissionDenied` and no subscription is
/// opened.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn watch(&self, options: WatchOptions) -> Result<LocationSubscription, LocationError>;
}

/// An open position subscription.
///
/// The subscription is a scoped resource: the backend holds the sensor
/// open until `stop` is called or the subscription is dropped. Release
/// happens exactly once no matter how often `stop` is called or whether
/// the value is simply dropped.
#[derive(Debug)]
pub struct LocationSubscription {
    updates: mpsc::Receiver<PositionUpdate>,
    cancel: CancellationToken,
    released: bool,
}

impl LocationSubscription {
    pub fn new(updates: mpsc::Receiver<PositionUpdate>, cancel: CancellationToken) -> Self {
        Self {
            updates,
            cancel,
            released: false,
        }
    }

    /// Wait for the next position fix. Returns `None` once the backend has
    /// shut down.
    pub async fn next(&mut self) -> Option<PositionUpdate> {
        self.updates.recv().await
    }

    /// Release the sensor subscription. Idempotent.
    pub fn stop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        tracing::debug!("releasing location subscription");
        self.cancel.cancel();
    }
}

impl Drop for LocationSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The platform's location backend, if this platform has one.
#[cfg(target_os = "linux")]
pub fn system_source() -> Option<Box<dyn LocationSource>> {
    Some(Box::new(crate::geoclue::GeoClueSource::new()))
}

#[cfg(windows)]
pub fn system_source() -> Option<Box<dyn LocationSource>> {
    Some(Box::new(crate::windows_backend::WindowsSource::new()))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn system_source() -> Option<Box<dyn LocationSource>> {
    tracing::warn!("no location backend for this platform");
    None
}
