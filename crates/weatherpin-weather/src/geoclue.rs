//! GeoClue2 position backend (Linux, via D-Bus).
//!
//! GeoClue owns the permission model: `Start` fails with `AccessDenied`
//! when the agent refuses the request. The distance threshold and accuracy
//! tier map directly onto the client object's properties.

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use zbus::zvariant::OwnedObjectPath;
use zbus::Connection;

use crate::location::{LocationSource, LocationSubscription};
use crate::types::{Accuracy, Coordinate, LocationError, PositionUpdate, WatchOptions};

const DESKTOP_ID: &str = "weatherpin";

#[zbus::proxy(
    interface = "org.freedesktop.GeoClue2.Manager",
    default_service = "org.freedesktop.GeoClue2",
    default_path = "/org/freedesktop/GeoClue2/Manager"
)]
trait Manager {
    fn get_client(&self) -> zbus::Result<OwnedObjectPath>;
}

#[zbus::proxy(
    interface = "org.freedesktop.GeoClue2.Client",
    default_service = "org.freedesktop.GeoClue2"
)]
trait Client {
    fn start(&self) -> zbus::Result<()>;

    fn stop(&self) -> zbus::Result<()>;

    #[zbus(property)]
    fn location(&self) -> zbus::Result<OwnedObjectPath>;

    #[zbus(property)]
    fn desktop_id(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn set_desktop_id(&self, id: &str) -> zbus::Result<()>;

    #[zbus(property)]
    fn distance_threshold(&self) -> zbus::Result<u32>;

    #[zbus(property)]
    fn set_distance_threshold(&self, threshold: u32) -> zbus::Result<()>;

    #[zbus(property)]
    fn requested_accuracy_level(&self) -> zbus::Result<u32>;

    #[zbus(property)]
    fn set_requested_accuracy_level(&self, level: u32) -> zbus::Result<()>;

    #[zbus(signal)]
    fn location_updated(
        &self,
        old_location: OwnedObjectPath,
        new_location: OwnedObjectPath,
    ) -> zbus::Result<()>;
}

#[zbus::proxy(
    interface = "org.freedesktop.GeoClue2.Location",
    default_service = "org.freedesktop.GeoClue2"
)]
trait GcLocation {
    #[zbus(property)]
    fn latitude(&self) -> zbus::Result<f64>;

    #[zbus(property)]
    fn longitude(&self) -> zbus::Result<f64>;

    #[zbus(property)]
    fn accuracy(&self) -> zbus::Result<f64>;
}

/// GCLUE_ACCURACY_LEVEL_* values.
fn accuracy_level(accuracy: Accuracy) -> u32 {
    match accuracy {
        Accuracy::City => 4,
        Accuracy::Street => 6,
        Accuracy::Exact => 8,
    }
}

fn map_zbus_error(e: zbus::Error) -> LocationError {
    match &e {
        zbus::Error::MethodError(name, _, _) if name.as_str().ends_with("AccessDenied") => {
            LocationError::PermissionDenied
        }
        _ => LocationError::Other(e.to_string()),
    }
}

#[derive(Debug, Default)]
pub struct GeoClueSource;

impl GeoClueSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LocationSource for GeoClueSource {
    async fn watch(&self, options: WatchOptions) -> Result<LocationSubscription, LocationError> {
        let connection = Connection::system().await.map_err(|e| {
            tracing::warn!("could not reach the system bus: {}", e);
            LocationError::ServiceUnavailable
        })?;

        let manager = ManagerProxy::new(&connection)
            .await
            .map_err(map_zbus_error)?;
        let client_path = manager.get_client().await.map_err(map_zbus_error)?;

        let client = ClientProxy::builder(&connection)
            .path(client_path)
            .map_err(map_zbus_error)?
            .build()
            .await
            .map_err(map_zbus_error)?;

        client
            .set_desktop_id(DESKTOP_ID)
            .await
            .map_err(map_zbus_error)?;
        client
            .set_distance_threshold(options.distance_interval_m)
            .await
            .map_err(map_zbus_error)?;
        client
            .set_requested_accuracy_level(accuracy_level(options.accuracy))
            .await
            .map_err(map_zbus_error)?;

        let mut updated = client
            .receive_location_updated()
            .await
            .map_err(map_zbus_error)?;

        client.start().await.map_err(map_zbus_error)?;
        tracing::info!(
            distance_threshold_m = options.distance_interval_m,
            "GeoClue position stream started"
        );

        let (tx, rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    signal = updated.next() => {
                        if signal.is_none() {
                            tracing::debug!("GeoClue signal stream ended");
                            break;
                        }
                        match read_location(&connection, &client).await {
                            Ok(update) => {
                                if tx.send(update).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::debug!("failed to read GeoClue location: {}", e),
                        }
                    }
                }
            }
            if let Err(e) = client.stop().await {
                tracing::debug!("GeoClue client stop failed: {}", e);
            }
        });

        Ok(LocationSubscription::new(rx, cancel))
    }
}

async fn read_location(
    connection: &Connection,
    client: &ClientProxy<'_>,
) -> Result<PositionUpdate, zbus::Error> {
    let path = client.location().await?;
    let location = GcLocationProxy::builder(connection)
        .path(path)?
        .build()
        .await?;

    let latitude = location.latitude().await?;
    let longitude = location.longitude().await?;
    let accuracy_m = location.accuracy().await.ok();

    Ok(PositionUpdate {
        coordinate: Coordinate::new(latitude, longitude),
        accuracy_m,
    })
}
